mod common;

use assert_matches::assert_matches;
use common::TestApp;
use gas_gauge::{
    calculations::StatusClass,
    entities::canister::CanisterStatus,
    errors::ServiceError,
    repositories::canister_repository::NewCanister,
    services::{
        gauge::{CreateCanister, CreateCanisterType, CreateWeighing, UpdateLabel},
        seed,
    },
};

#[tokio::test]
async fn coleman_scenario_end_to_end() {
    let app = TestApp::seeded().await;
    let coleman = app
        .service()
        .canister_types()
        .find_by_name("Coleman 240g")
        .await
        .unwrap()
        .expect("seeded type");
    let canister = app.create_canister("Kitchen", coleman.id).await;
    app.weigh(&canister.id, 324, "2024-05-01T08:00").await;

    let detail = app
        .service()
        .canister_detail_view(&canister.id)
        .await
        .unwrap()
        .expect("detail for known canister");

    assert_eq!(detail.gas_capacity, 239);
    let latest = detail.latest_weighing.expect("latest weighing");
    assert_eq!(latest.reading.remaining_gas, 202);
    assert!((latest.reading.remaining_percentage - 84.52).abs() < 0.01);
    assert!((latest.reading.consumption_percentage - 15.48).abs() < 0.01);
    assert_eq!(detail.status_class, StatusClass::High);
}

#[tokio::test]
async fn deleting_a_canister_removes_its_weighings() {
    let app = TestApp::new().await;
    let ty = app.create_type("Test 300g", 400, 100).await;
    let canister = app.create_canister("Doomed", ty.id).await;
    app.weigh(&canister.id, 390, "2024-05-01T08:00").await;
    app.weigh(&canister.id, 350, "2024-05-02T08:00").await;
    app.weigh(&canister.id, 300, "2024-05-03T08:00").await;

    let removed = app.service().delete_canister(&canister.id).await.unwrap();
    assert_eq!(removed, 3);

    let left = app
        .service()
        .weighings()
        .find_for_canister(&canister.id)
        .await
        .unwrap();
    assert!(left.is_empty());
    assert_matches!(
        app.service().get_canister(&canister.id).await,
        Err(ServiceError::NotFound(_))
    );
    assert_matches!(
        app.service().delete_canister(&canister.id).await,
        Err(ServiceError::NotFound(_))
    );
}

#[tokio::test]
async fn inverted_type_weights_are_rejected_and_not_stored() {
    let app = TestApp::new().await;
    let result = app
        .service()
        .create_canister_type(CreateCanisterType {
            name: "Backwards".into(),
            full_weight: 200,
            empty_weight: 300,
        })
        .await;

    assert_matches!(result, Err(ServiceError::ValidationError(msg)) if msg.contains("Empty weight"));
    assert!(app.service().list_canister_types().await.unwrap().is_empty());

    let equal = app
        .service()
        .create_canister_type(CreateCanisterType {
            name: "Flat".into(),
            full_weight: 200,
            empty_weight: 200,
        })
        .await;
    assert_matches!(equal, Err(ServiceError::ValidationError(_)));
}

#[tokio::test]
async fn duplicate_type_names_conflict() {
    let app = TestApp::new().await;
    app.create_type("Campingaz CV300", 390, 150).await;

    let again = app
        .service()
        .create_canister_type(CreateCanisterType {
            name: "  Campingaz CV300 ".into(),
            full_weight: 390,
            empty_weight: 150,
        })
        .await;
    assert_matches!(again, Err(ServiceError::Conflict(_)));
    assert_eq!(app.service().list_canister_types().await.unwrap().len(), 1);
}

#[tokio::test]
async fn dashboard_lists_active_by_label_then_depleted() {
    let app = TestApp::new().await;
    let ty = app.create_type("Test 300g", 400, 100).await;
    let zeta = app.create_canister("Zeta", ty.id).await;
    let alpha = app.create_canister("Alpha", ty.id).await;
    let bravo = app.create_canister("Bravo", ty.id).await;
    app.service().mark_depleted(&alpha.id).await.unwrap();
    app.weigh(&zeta.id, 350, "2024-05-01T08:00").await;

    let view = app.service().dashboard_view().await.unwrap();
    let labels: Vec<&str> = view
        .canisters
        .iter()
        .map(|s| s.canister.label.as_str())
        .collect();
    assert_eq!(labels, ["Bravo", "Zeta", "Alpha"]);

    let classes: Vec<StatusClass> = view.canisters.iter().map(|s| s.status_class).collect();
    assert_eq!(
        classes,
        [StatusClass::None, StatusClass::High, StatusClass::Depleted]
    );
    assert_eq!(view.canisters[0].canister.id, bravo.id);
    assert!(view.canisters[2].is_depleted);
    assert_eq!(view.canister_types.len(), 1);
    assert!(view.suggested_label.starts_with("GC-"));
}

#[tokio::test]
async fn seeding_is_idempotent() {
    let app = TestApp::new().await;
    let repo = app.service().canister_types();

    let first = seed::seed_canister_types(repo).await.unwrap();
    assert_eq!(first.created, seed::SEED_TYPES.len());
    assert_eq!(first.existing, 0);

    let second = seed::seed_canister_types(repo).await.unwrap();
    assert_eq!(second.created, 0);
    assert_eq!(second.existing, seed::SEED_TYPES.len());
    assert_eq!(
        app.service().list_canister_types().await.unwrap().len(),
        seed::SEED_TYPES.len()
    );
}

#[tokio::test]
async fn type_deletion_rules() {
    let app = TestApp::seeded().await;
    let protected = app
        .service()
        .canister_types()
        .find_by_name("Primus 230g")
        .await
        .unwrap()
        .expect("seeded type");
    assert_matches!(
        app.service().delete_canister_type(protected.id).await,
        Err(ServiceError::InvalidOperation(_))
    );

    let custom = app.create_type("Custom 500g", 700, 200).await;
    let canister = app.create_canister("Uses custom", custom.id).await;
    assert_eq!(
        app.service()
            .canister_types()
            .count_canisters(custom.id)
            .await
            .unwrap(),
        1
    );
    assert_matches!(
        app.service().delete_canister_type(custom.id).await,
        Err(ServiceError::Conflict(_))
    );

    app.service().delete_canister(&canister.id).await.unwrap();
    let deleted = app.service().delete_canister_type(custom.id).await.unwrap();
    assert_eq!(deleted.name, "Custom 500g");
    assert_matches!(
        app.service().delete_canister_type(custom.id).await,
        Err(ServiceError::NotFound(_))
    );
}

#[tokio::test]
async fn canister_creation_validates_label_and_type() {
    let app = TestApp::new().await;
    let ty = app.create_type("Test 300g", 400, 100).await;

    let trimmed = app.create_canister("  Stove box  ", ty.id).await;
    assert_eq!(trimmed.label, "Stove box");
    assert_eq!(trimmed.status, CanisterStatus::Active);

    let blank = app
        .service()
        .create_canister(CreateCanister {
            label: "   ".into(),
            canister_type_id: ty.id,
        })
        .await;
    assert_matches!(blank, Err(ServiceError::ValidationError(_)));

    let too_long = app
        .service()
        .create_canister(CreateCanister {
            label: "x".repeat(65),
            canister_type_id: ty.id,
        })
        .await;
    assert_matches!(too_long, Err(ServiceError::ValidationError(_)));

    let missing_type = app
        .service()
        .create_canister(CreateCanister {
            label: "Orphan".into(),
            canister_type_id: ty.id + 100,
        })
        .await;
    assert_matches!(missing_type, Err(ServiceError::InvalidInput(_)));
    assert_eq!(app.service().list_canisters(None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn colliding_ids_are_retried_then_rejected() {
    let app = TestApp::new().await;
    let ty = app.create_type("Test 300g", 400, 100).await;
    let repo = app.service().canisters();
    let new = |label: &str| NewCanister {
        label: label.to_string(),
        canister_type_id: ty.id,
    };

    let first = repo
        .create_with_id_source(new("First"), || "GC-aaaaaa0001".to_string())
        .await
        .unwrap();
    assert_eq!(first.id, "GC-aaaaaa0001");

    let mut candidates = vec!["GC-aaaaaa0001", "GC-bbbbbb0002"].into_iter();
    let second = repo
        .create_with_id_source(new("Second"), move || {
            candidates.next().unwrap_or("GC-cccccc0003").to_string()
        })
        .await
        .unwrap();
    assert_eq!(second.id, "GC-bbbbbb0002");

    let exhausted = repo
        .create_with_id_source(new("Third"), || "GC-aaaaaa0001".to_string())
        .await;
    assert_matches!(exhausted, Err(ServiceError::Conflict(_)));
    assert_eq!(repo.find_all(None).await.unwrap().len(), 2);
}

#[tokio::test]
async fn status_transitions_rewrite_the_same_value() {
    let app = TestApp::new().await;
    let ty = app.create_type("Test 300g", 400, 100).await;
    let canister = app.create_canister("Toggle", ty.id).await;

    let depleted = app.service().mark_depleted(&canister.id).await.unwrap();
    assert_eq!(depleted.status, CanisterStatus::Depleted);
    let again = app.service().mark_depleted(&canister.id).await.unwrap();
    assert_eq!(again.status, CanisterStatus::Depleted);

    let active = app
        .service()
        .list_canisters(Some(CanisterStatus::Active))
        .await
        .unwrap();
    assert!(active.is_empty());

    let back = app.service().reactivate(&canister.id).await.unwrap();
    assert_eq!(back.status, CanisterStatus::Active);

    assert_matches!(
        app.service().mark_depleted("GC-missing0000").await,
        Err(ServiceError::NotFound(_))
    );
}

#[tokio::test]
async fn labels_can_be_renamed() {
    let app = TestApp::new().await;
    let ty = app.create_type("Test 300g", 400, 100).await;
    let canister = app.create_canister("Old", ty.id).await;

    let renamed = app
        .service()
        .update_label(&canister.id, UpdateLabel { label: " New ".into() })
        .await
        .unwrap();
    assert_eq!(renamed.label, "New");
    assert_eq!(renamed.id, canister.id);

    assert_matches!(
        app.service()
            .update_label(&canister.id, UpdateLabel { label: "".into() })
            .await,
        Err(ServiceError::ValidationError(_))
    );
    assert_matches!(
        app.service()
            .update_label("GC-missing0000", UpdateLabel { label: "x".into() })
            .await,
        Err(ServiceError::NotFound(_))
    );
}

#[tokio::test]
async fn weighings_are_validated_against_their_canister() {
    let app = TestApp::new().await;
    let ty = app.create_type("Test 300g", 400, 100).await;
    let canister = app.create_canister("Scale", ty.id).await;

    let zero = app
        .service()
        .create_weighing(
            &canister.id,
            CreateWeighing {
                weight: 0,
                ..Default::default()
            },
        )
        .await;
    assert_matches!(zero, Err(ServiceError::ValidationError(_)));

    let unknown = app
        .service()
        .create_weighing(
            "GC-missing0000",
            CreateWeighing {
                weight: 250,
                ..Default::default()
            },
        )
        .await;
    assert_matches!(unknown, Err(ServiceError::InvalidInput(_)));

    let bad_date = app
        .service()
        .create_weighing(
            &canister.id,
            CreateWeighing {
                weight: 250,
                recorded_at: Some("yesterday".into()),
                comment: None,
            },
        )
        .await;
    assert_matches!(bad_date, Err(ServiceError::ValidationError(_)));

    let stored = app
        .service()
        .create_weighing(
            &canister.id,
            CreateWeighing {
                weight: 250,
                recorded_at: None,
                comment: Some("   ".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(stored.comment, None);
}

#[tokio::test]
async fn latest_weighing_is_by_recorded_time_then_insert_order() {
    let app = TestApp::new().await;
    let ty = app.create_type("Test 300g", 400, 100).await;
    let canister = app.create_canister("History", ty.id).await;

    app.weigh(&canister.id, 380, "2024-05-03T08:00").await;
    // back-dated entry inserted later must not become the latest
    app.weigh(&canister.id, 395, "2024-05-01T08:00").await;
    app.weigh(&canister.id, 370, "2024-05-03T08:00").await;

    let latest = app
        .service()
        .weighings()
        .latest_for_canister(&canister.id)
        .await
        .unwrap()
        .expect("latest weighing");
    assert_eq!(latest.weight, 370);

    let detail = app
        .service()
        .canister_detail_view(&canister.id)
        .await
        .unwrap()
        .expect("detail");
    let weights: Vec<i32> = detail.weighings.iter().map(|w| w.weighing.weight).collect();
    assert_eq!(weights, [370, 380, 395]);
    let from_full = detail.weighings[2].consumed_since_previous;
    assert!((from_full - 5.0 / 3.0).abs() < 0.01, "got {from_full}");
    let since = detail.weighings[1].consumed_since_previous;
    assert!((since - 5.0).abs() < 0.01, "got {since}");
}

#[tokio::test]
async fn deleting_a_weighing_returns_its_canister() {
    let app = TestApp::new().await;
    let ty = app.create_type("Test 300g", 400, 100).await;
    let canister = app.create_canister("Trim", ty.id).await;
    app.weigh(&canister.id, 380, "2024-05-03T08:00").await;

    let weighing_id = app.service().list_weighings(Some(canister.id.as_str())).await.unwrap()[0]
        .weighing
        .id;
    let owner = app.service().delete_weighing(weighing_id).await.unwrap();
    assert_eq!(owner, canister.id);
    assert_matches!(
        app.service().delete_weighing(weighing_id).await,
        Err(ServiceError::NotFound(_))
    );
}

#[tokio::test]
async fn unknown_ids_produce_absent_views() {
    let app = TestApp::new().await;
    assert!(app
        .service()
        .canister_detail_view("GC-missing0000")
        .await
        .unwrap()
        .is_none());
    assert_matches!(
        app.service().cheat_sheet(999).await,
        Err(ServiceError::NotFound(_))
    );
}
