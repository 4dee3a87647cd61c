//! Import equivalence scenarios.

use veristate_acceptance::fixtures::{fast_options, init_tracing, runner};
use veristate_acceptance::{template, SimBus, TestData, NON_READABLE_FIELDS};
use veristate_acceptance::{assert_case_passed, assert_case_failed};
use veristate_harness::{AttrAssertion, Step, TestCase};

#[tokio::test]
async fn import_after_create() {
    init_tracing();
    let sim = SimBus::new();
    let data = TestData::new();

    let case = TestCase::new(
        "import_after_create",
        data.identity(),
        vec![
            Step::apply(template::basic(&data)),
            Step::import(NON_READABLE_FIELDS.iter().copied()),
        ],
    )
    .with_options(fast_options());

    assert_case_passed!(runner(&sim).run(&case).await);
}

#[tokio::test]
async fn import_after_update_sees_current_state() {
    init_tracing();
    let sim = SimBus::new();
    let data = TestData::new();

    // The import comparison runs against the most recent apply, so an
    // update in between must not produce mismatches.
    let case = TestCase::new(
        "import_after_update",
        data.identity(),
        vec![
            Step::apply(template::basic(&data)),
            Step::apply_with(
                template::standard(&data),
                vec![AttrAssertion::equals("sku", "Standard")],
            ),
            Step::import(NON_READABLE_FIELDS.iter().copied()),
        ],
    )
    .with_options(fast_options());

    assert_case_passed!(runner(&sim).run(&case).await);
}

#[tokio::test]
async fn import_without_allow_list_reports_every_hidden_field() {
    init_tracing();
    let sim = SimBus::new();
    let data = TestData::new();

    // The bare keys are write-only; importing without allow-listing them
    // must fail naming each one — never silently skip.
    let case = TestCase::new(
        "import_without_allow_list",
        data.identity(),
        vec![
            Step::apply(template::basic(&data)),
            Step::import(Vec::<String>::new()),
        ],
    )
    .with_options(fast_options());

    let report = runner(&sim).run(&case).await;
    assert_case_failed!(report, "default_primary_key");
    assert_case_failed!(report, "default_secondary_key");
}

#[tokio::test]
async fn import_covers_generated_server_side_fields() {
    init_tracing();
    let sim = SimBus::new();
    let data = TestData::new();

    // Server-generated attributes (id, connection strings) are readable and
    // must round-trip through the import path unchanged.
    let case = TestCase::new(
        "import_generated_fields",
        data.identity(),
        vec![
            Step::apply_with(
                template::standard(&data),
                vec![AttrAssertion::present("namespace_id")],
            ),
            Step::import(NON_READABLE_FIELDS.iter().copied()),
        ],
    )
    .with_options(fast_options());

    assert_case_passed!(runner(&sim).run(&case).await);
}
