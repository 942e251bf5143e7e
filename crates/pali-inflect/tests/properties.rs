use std::collections::HashSet;

use pali_inflect::{derive_entry, generate_table};
use pali_types::{Grid, Headword, PatternTemplate};
use proptest::prelude::*;

fn grid_strategy() -> impl Strategy<Value = Grid> {
    (1usize..4, 1usize..5).prop_flat_map(|(groups, rows)| {
        let cell = prop::collection::vec("[aeiouṃā]{0,3}", 0..4);
        prop::collection::vec(prop::collection::vec(cell, groups), rows).prop_map(
            move |data_rows| {
                let mut header = vec![vec![String::new()]];
                for g in 0..groups {
                    header.push(vec![format!("group {g}")]);
                    header.push(vec![String::new()]);
                }
                let mut grid = vec![header];
                for (r, cells) in data_rows.into_iter().enumerate() {
                    let mut row = vec![vec![format!("role {r}")]];
                    for (g, endings) in cells.into_iter().enumerate() {
                        row.push(endings);
                        row.push(vec![format!("role {r} group {g}")]);
                    }
                    grid.push(row);
                }
                grid
            },
        )
    })
}

fn headword(stem: &str, clean_form: &str) -> Headword {
    Headword {
        id: 1,
        label: format!("{clean_form} 1"),
        pos: "masc".into(),
        stem: stem.into(),
        pattern: "test".into(),
        clean_form: clean_form.into(),
    }
}

proptest! {
    #[test]
    fn inflection_list_is_distinct_and_complete(
        stem in "[kgcjtdnpbm]{1,4}",
        clean_suffix in "[aiu]",
        grid in grid_strategy(),
    ) {
        let clean_form = format!("{stem}{clean_suffix}");
        let hw = headword(&stem, &clean_form);
        let template = PatternTemplate { pattern: "test".into(), like: "x".into(), data: grid.clone() };
        let table = generate_table(&hw, &template, |form| form.len() % 2 == 0).unwrap();

        prop_assert_eq!(&table.inflections[0], &clean_form);
        let distinct: HashSet<&String> = table.inflections.iter().collect();
        prop_assert_eq!(distinct.len(), table.inflections.len());

        for row in grid.iter().skip(1) {
            for endings in row.iter().skip(1).step_by(2) {
                for ending in endings.iter().filter(|e| !e.is_empty()) {
                    let surface = format!("{stem}{ending}");
                    prop_assert!(table.inflections.contains(&surface));
                }
            }
        }
    }

    #[test]
    fn irregular_stems_index_only_the_clean_form(
        stem in "[kgcjtdnpbm]{1,4}",
        grid in grid_strategy(),
    ) {
        let clean_form = format!("{stem}a");
        let hw = headword(&format!("{stem}!"), &clean_form);
        let template = PatternTemplate { pattern: "test".into(), like: "x".into(), data: grid };
        let entry = derive_entry(&hw, Some(&template), |_| true).unwrap();
        prop_assert_eq!(entry.inflections, vec![clean_form]);
        prop_assert!(!entry.html_table.is_empty());
    }
}
