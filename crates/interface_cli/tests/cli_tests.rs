//! End-to-end tests for the command surface over snapshot files

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tempfile::TempDir;

use domain_billing::InvoicePort;
use infra_store::{load_snapshot, save_snapshot};
use interface_cli::{run, Command, WindowArgs};
use test_utils::*;

fn january() -> WindowArgs {
    WindowArgs {
        from: "01/01/2024".into(),
        to: "31/01/2024".into(),
    }
}

/// Writes the canonical catalog with one metered client into a temp dir
fn seeded_snapshot(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("state").join("catalog.json");
    let store = seeded_store([small_vm_client(
        IdFixtures::acme(),
        &[(dec!(10), "05/01/2024 10:00"), (dec!(2), "03/02/2024 08:00")],
    )]);
    save_snapshot(&path, &store.snapshot().unwrap()).unwrap();
    path
}

mod generate_tests {
    use super::*;

    #[test]
    fn test_generate_persists_invoice_and_flags() {
        let dir = TempDir::new().unwrap();
        let path = seeded_snapshot(&dir);

        let output = run(&Command::Generate(january()), &path).unwrap();
        assert_eq!(output["invoices"].as_array().unwrap().len(), 1);
        assert_eq!(output["invoices"][0]["total_amount"], "60.00");
        assert_eq!(output["invoices"][0]["client_nit"], "12345-6");

        let snapshot = load_snapshot(&path).unwrap();
        assert_eq!(snapshot.invoices.len(), 1);
        let instance = &snapshot.clients[0].instances()[0];
        assert!(instance.consumptions()[0].is_billed());
        assert!(!instance.consumptions()[1].is_billed());
    }

    #[test]
    fn test_generate_twice_bills_nothing_new() {
        let dir = TempDir::new().unwrap();
        let path = seeded_snapshot(&dir);

        run(&Command::Generate(january()), &path).unwrap();
        let second = run(&Command::Generate(january()), &path).unwrap();

        assert!(second["invoices"].as_array().unwrap().is_empty());
        assert_eq!(load_snapshot(&path).unwrap().invoices.len(), 1);
    }

    #[test]
    fn test_generate_rejects_bad_window_without_writing() {
        let dir = TempDir::new().unwrap();
        let path = seeded_snapshot(&dir);
        let before = std::fs::read_to_string(&path).unwrap();

        let inverted = WindowArgs {
            from: "31/01/2024".into(),
            to: "01/01/2024".into(),
        };
        assert!(run(&Command::Generate(inverted), &path).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }
}

mod report_tests {
    use super::*;

    #[test]
    fn test_reports_do_not_write_snapshot() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.json");

        let output = run(&Command::Summary, &path).unwrap();
        assert_eq!(output["total_invoices"], 0);
        assert!(!path.exists());
    }

    #[test]
    fn test_invoice_lookup_after_generate() {
        let dir = TempDir::new().unwrap();
        let path = seeded_snapshot(&dir);
        run(&Command::Generate(january()), &path).unwrap();

        let snapshot = load_snapshot(&path).unwrap();
        let store = infra_store::InMemoryStore::from_snapshot(snapshot).unwrap();
        let number = store.max_invoice_number().unwrap().unwrap();

        let invoice = run(&Command::Invoice { number }, &path).unwrap();
        assert_eq!(invoice["lines"].as_array().unwrap().len(), 1);

        let missing = run(&Command::Invoice { number: number.next().unwrap() }, &path);
        assert!(missing.is_err());
    }

    #[test]
    fn test_pending_and_price_list() {
        let dir = TempDir::new().unwrap();
        let path = seeded_snapshot(&dir);

        let pending = run(&Command::Pending { nit: None }, &path).unwrap();
        assert_eq!(pending.as_array().unwrap().len(), 1);

        let prices = run(&Command::PriceList, &path).unwrap();
        let costs: Vec<Decimal> = prices
            .as_array()
            .unwrap()
            .iter()
            .map(|entry| entry["hourly_cost"].as_str().unwrap().parse().unwrap())
            .collect();
        assert_eq!(costs, vec![dec!(6.00), dec!(6.10)]);
    }

    #[test]
    fn test_reset_clears_snapshot() {
        let dir = TempDir::new().unwrap();
        let path = seeded_snapshot(&dir);

        run(&Command::Reset, &path).unwrap();
        assert!(load_snapshot(&path).unwrap().is_empty());
    }
}

mod load_tests {
    use super::*;

    #[test]
    fn test_load_feeds_then_bill() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalog.json");
        let catalog = dir.path().join("catalog-feed.json");
        let meter = dir.path().join("meter-feed.json");
        std::fs::write(
            &catalog,
            r#"{
                "resources": [
                    {"id": 1, "name": "vCPU", "abbreviation": "CPU", "unit_of_measure": "core", "kind": "Hardware", "hourly_rate": "2.0"},
                    {"id": 2, "name": "Broken", "abbreviation": "B", "unit_of_measure": "unit", "kind": "Hardware", "hourly_rate": "-1"}
                ],
                "categories": [{"id": 1, "name": "Compute", "configurations": [
                    {"id": 10, "name": "Small VM", "resource_quantities": [{"resource_id": 1, "quantity": "3"}]}
                ]}],
                "clients": [{"nit": "12345-6", "name": "Acme", "username": "acme", "email": "ops@acme.test",
                    "instances": [{"id": 1, "configuration_id": 10, "name": "web-01", "start_date": "01/01/2024", "state": "Active"}]}]
            }"#,
        )
        .unwrap();
        std::fs::write(
            &meter,
            r#"{"consumptions": [
                {"nit": "12345-6", "instance_id": 1, "hours": "10", "timestamp": "05/01/2024 10:00"},
                {"nit": "12345-6", "instance_id": 1, "hours": "-4", "timestamp": "06/01/2024 10:00"}
            ]}"#,
        )
        .unwrap();

        let loaded = run(&Command::LoadCatalog { file: catalog }, &path).unwrap();
        assert_eq!(loaded["accepted"], 5);
        assert_eq!(loaded["rejected"], 1);

        let metered = run(&Command::LoadConsumption { file: meter }, &path).unwrap();
        assert_eq!(metered["accepted"], 1);
        assert_eq!(metered["rejected"], 1);
        assert_eq!(metered["errors"].as_array().unwrap().len(), 1);

        let output = run(&Command::Generate(january()), &path).unwrap();
        assert_eq!(output["invoices"][0]["total_amount"], "60.00");
    }

    #[test]
    fn test_unreadable_feed_leaves_snapshot_alone() {
        let dir = TempDir::new().unwrap();
        let path = seeded_snapshot(&dir);
        let before = std::fs::read_to_string(&path).unwrap();
        let feed = dir.path().join("broken.json");
        std::fs::write(&feed, "{ not json").unwrap();

        assert!(run(&Command::LoadCatalog { file: feed }, &path).is_err());
        assert!(run(&Command::LoadConsumption { file: dir.path().join("absent.json") }, &path).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }
}
