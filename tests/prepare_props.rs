//! Property checks on the normalizer's margin derivation and numeric
//! coercion, driven through the public library API.

use proptest::prelude::*;

use sales_lens::orders::RawTable;
use sales_lens::prepare::normalize;
use sales_lens::schema::required_names;

fn raw_row(nett: &str, cost: &str) -> RawTable {
    let mut cells: Vec<String> = vec![
        "A1".into(),
        "ACC1".into(),
        "Smith".into(),
        "1 High Street".into(),
        "Widget".into(),
        "STD".into(),
        "01/03/2024".into(),
        "".into(),
        "1".into(),
        "12.50".into(),
        String::new(),
        String::new(),
        "R1".into(),
        "REF".into(),
        "PL1".into(),
        "N".into(),
        "S".into(),
        "Y".into(),
    ];
    cells[10] = nett.to_string();
    cells[11] = cost.to_string();
    RawTable {
        headers: required_names(),
        rows: vec![cells],
    }
}

proptest! {
    #[test]
    fn margin_rule_holds_for_finite_inputs(
        nett in -1.0e6f64..1.0e6,
        cost in -1.0e6f64..1.0e6,
    ) {
        let table = normalize(&raw_row(&nett.to_string(), &cost.to_string()));
        let rec = &table.rows()[0];
        let parsed_nett = rec.nett.unwrap();
        let parsed_cost = rec.cost.unwrap();
        let margin = rec.gross_margin.unwrap();
        prop_assert!((margin - (parsed_nett - parsed_cost)).abs() < 1e-9);
        if parsed_nett == 0.0 {
            prop_assert!(rec.margin_pct.is_none());
        } else {
            let expected = (margin / parsed_nett * 100.0 * 10.0).round() / 10.0;
            prop_assert_eq!(rec.margin_pct, Some(expected));
        }
    }

    #[test]
    fn garbage_numerics_never_panic_and_null_out(text in "[a-zA-Z ]{0,12}") {
        let table = normalize(&raw_row(&text, "5"));
        let rec = &table.rows()[0];
        if text.trim().parse::<f64>().is_err() {
            prop_assert!(rec.nett.is_none());
            prop_assert!(rec.gross_margin.is_none());
            prop_assert!(rec.margin_pct.is_none());
        }
    }

    #[test]
    fn row_count_is_always_preserved(extra in 0usize..40) {
        let mut raw = raw_row("100", "60");
        let template = raw.rows[0].clone();
        for _ in 0..extra {
            raw.rows.push(template.clone());
        }
        let table = normalize(&raw);
        prop_assert_eq!(table.len(), extra + 1);
    }
}
