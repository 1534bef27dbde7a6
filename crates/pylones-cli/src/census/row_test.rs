use pylones_anfr::QueryMode;
use serde_json::json;
use wiremock::matchers::{method, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;
use crate::test_support::{location, mount_defaults, test_context, towers_body};

#[test]
fn plan_issues_tower_then_generations_per_operator_then_all_towers() {
    let catalog = Catalog::default();
    let paris = location("PARIS", "48.8566", "2.3522");
    let plan = plan_row(&catalog, &paris, 1500, false);

    // One query per derived column: 16 antenna counts, 4 operator towers, 1 all.
    assert_eq!(plan.len(), catalog.derived_len());
    assert_eq!(plan.len(), 21);

    let first = &plan[0];
    assert_eq!(first.query.mode, QueryMode::TowerFacet);
    assert_eq!(first.query.operator, Some("ORANGE"));
    assert_eq!(first.tally, Tally::UniqueTowers);
    assert_eq!(first.slot, catalog.operator_tower_slot(0));

    let orange_2g = &plan[1];
    assert_eq!(orange_2g.query.mode, QueryMode::AntennaCount);
    assert_eq!(orange_2g.query.generation, Some("2G"));
    assert_eq!(orange_2g.tally, Tally::Hits);
    assert_eq!(orange_2g.slot, catalog.antenna_slot(0, 0));

    let sfr_towers = &plan[5];
    assert_eq!(sfr_towers.query.operator, Some("SFR"));
    assert_eq!(sfr_towers.query.mode, QueryMode::TowerFacet);

    let last = plan.last().unwrap();
    assert_eq!(last.query.mode, QueryMode::TowerFacet);
    assert_eq!(last.query.operator, None);
    assert_eq!(last.slot, catalog.all_towers_slot());
}

#[test]
fn plan_restricts_operator_towers_only_when_asked() {
    let catalog = Catalog::default();
    let paris = location("PARIS", "48.8566", "2.3522");

    let plain = plan_row(&catalog, &paris, 1500, false);
    let filtered = plan_row(&catalog, &paris, 1500, true);

    for op_idx in 0..catalog.operators().len() {
        let slot = catalog.operator_tower_slot(op_idx);
        let plain_query = plain.iter().find(|p| p.slot == slot).unwrap().query;
        let filtered_query = filtered.iter().find(|p| p.slot == slot).unwrap().query;
        assert_eq!(plain_query.mode, QueryMode::TowerFacet);
        assert_eq!(filtered_query.mode, QueryMode::OperatorTowerFacet);
        assert_eq!(
            filtered_query.operator,
            Some(catalog.operators()[op_idx].as_str())
        );
    }
    assert_eq!(
        filtered.last().unwrap().query.mode,
        QueryMode::TowerFacet,
        "the all-operator count never filters"
    );
}

#[test]
fn plan_fills_every_slot_exactly_once() {
    let catalog = Catalog::default();
    let paris = location("PARIS", "48.8566", "2.3522");
    let mut slots: Vec<usize> = plan_row(&catalog, &paris, 1500, false)
        .iter()
        .map(|p| p.slot)
        .collect();
    slots.sort_unstable();
    // 16 antenna slots are filled by 16 queries, 4 + 1 tower slots by 5.
    let expected: Vec<usize> = (0..catalog.derived_len()).collect();
    assert_eq!(slots, expected);
}

#[test]
fn plan_carries_location_coordinates_and_radius() {
    let catalog = Catalog::default();
    let lyon = location("LYON", "45.7640", "4.8357");
    for planned in plan_row(&catalog, &lyon, 5000, false) {
        assert_eq!(planned.query.latitude, "45.7640");
        assert_eq!(planned.query.longitude, "4.8357");
        assert_eq!(planned.query.radius, 5000);
    }
}

/// Antenna hits of 99 for SFR 4G, towers `[7, 7]` for an ORANGE-filtered
/// facet, `[1, 2, 3, 4, 4]` for an unfiltered facet, defaults elsewhere.
async fn mount_paris(server: &MockServer) {
    Mock::given(method("GET"))
        .and(query_param("refine.adm_lb_nom", "SFR"))
        .and(query_param("refine.generation", "4G"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"nhits": 99, "records": []})),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(query_param("facet", "sup_id"))
        .and(query_param("refine.adm_lb_nom", "ORANGE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(towers_body(&[7, 7])))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(query_param("facet", "sup_id"))
        .and(query_param_is_missing("refine.adm_lb_nom"))
        .respond_with(ResponseTemplate::new(200).set_body_json(towers_body(&[1, 2, 3, 4, 4])))
        .mount(server)
        .await;

    mount_defaults(server, 5, &[1, 1, 2]).await;
}

#[tokio::test]
async fn process_row_merges_every_count_into_its_column() {
    let server = MockServer::start().await;
    mount_paris(&server).await;

    let ctx = test_context(&server);
    let paris = location("PARIS", "48.8566", "2.3522");
    let row = process_row(&ctx, &paris, 1500).await;

    let catalog = &ctx.catalog;
    let counts = row.counts();
    assert_eq!(counts.len(), 21);
    assert_eq!(counts[catalog.antenna_slot(1, 2)], Count::Known(99), "SFR 4G");
    assert_eq!(counts[catalog.antenna_slot(0, 0)], Count::Known(5), "ORANGE 2G");
    for op_idx in 0..catalog.operators().len() {
        assert_eq!(
            counts[catalog.operator_tower_slot(op_idx)],
            Count::Known(4),
            "per-operator tower queries count every operator"
        );
    }
    assert_eq!(counts[catalog.all_towers_slot()], Count::Known(4), "PYLONES TOUS");
    assert_eq!(row.unavailable_count(), 0);
    assert_eq!(row.fields(), paris.fields.as_slice());

    let requests = server.received_requests().await.expect("recording enabled");
    assert_eq!(requests.len(), ctx.queries_per_row());
    assert!(requests
        .iter()
        .filter(|r| r.url.query_pairs().any(|(k, _)| k == "facet"))
        .all(|r| !r.url.query_pairs().any(|(k, _)| k == "refine.adm_lb_nom")));
}

#[tokio::test]
async fn process_row_with_tower_operator_filter_counts_each_operator() {
    let server = MockServer::start().await;
    mount_paris(&server).await;

    let mut ctx = test_context(&server);
    ctx.tower_operator_filter = true;
    let row = process_row(&ctx, &location("PARIS", "48.8566", "2.3522"), 1500).await;

    let catalog = &ctx.catalog;
    let counts = row.counts();
    assert_eq!(counts[catalog.operator_tower_slot(0)], Count::Known(1), "PYLONES ORANGE");
    assert_eq!(counts[catalog.operator_tower_slot(2)], Count::Known(2), "PYLONES BOUYGUES");
    assert_eq!(counts[catalog.all_towers_slot()], Count::Known(4), "PYLONES TOUS");
}

#[tokio::test]
async fn process_row_degrades_failed_fetches_to_zero() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let ctx = test_context(&server);
    let paris = location("PARIS", "48.8566", "2.3522");
    let row = process_row(&ctx, &paris, 1500).await;

    assert_eq!(row.counts().len(), 21);
    assert!(row.counts().iter().all(|c| c.is_unavailable() && c.value() == 0));
    assert_eq!(row.fields(), paris.fields.as_slice());

    // 21 sub-queries, 3 attempts each.
    let requests = server.received_requests().await.expect("recording enabled");
    assert_eq!(requests.len(), ctx.queries_per_row() * 3);
    assert_eq!(requests.len(), 63);
}

#[tokio::test]
async fn process_row_keeps_partial_results_when_one_query_fails() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("refine.adm_lb_nom", "FREE MOBILE"))
        .and(query_param("refine.generation", "5G"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    mount_defaults(&server, 3, &[10]).await;

    let ctx = test_context(&server);
    let row = process_row(&ctx, &location("NICE", "43.70", "7.27"), 2500).await;

    let slot = ctx.catalog.antenna_slot(3, 3);
    assert_eq!(row.counts()[slot], Count::Unavailable);
    assert_eq!(row.unavailable_count(), 1);
    assert_eq!(row.to_record(false)[5 + slot], "0");
    assert_eq!(row.to_record(true)[5 + slot], "NA");
}

#[tokio::test]
async fn concurrent_sub_queries_produce_the_same_row() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("refine.adm_lb_nom", "ORANGE"))
        .and(query_param("refine.generation", "3G"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"nhits": 42, "records": []})),
        )
        .mount(&server)
        .await;
    mount_defaults(&server, 8, &[1, 2]).await;

    let mut ctx = test_context(&server);
    let lille = location("LILLE", "50.63", "3.06");

    let sequential = process_row(&ctx, &lille, 1500).await;
    ctx.row_concurrency = 6;
    let concurrent = process_row(&ctx, &lille, 1500).await;

    assert_eq!(sequential, concurrent);
    assert_eq!(
        concurrent.counts()[ctx.catalog.antenna_slot(0, 1)],
        Count::Known(42)
    );
}
