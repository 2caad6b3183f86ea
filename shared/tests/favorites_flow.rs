mod common;

use catalog_core::{AppError, CharacterId, ErrorKind, Event, Model};

use common::{deliver_page, http_urls, kv_reads, kv_writes, page, started, Tester};

#[test]
fn empty_storage_hydrates_to_empty_map() {
    let app = Tester::default();
    let model = started(&app);

    let view = app.view(&model);
    assert!(view.favorites_ready);
    assert_eq!(view.favorite_count, 0);
    assert!(view.error.is_none());
    assert!(model.favorites.snapshot().is_empty());
}

#[test]
fn toggle_before_hydration_is_not_persisted() {
    let app = Tester::default();
    let mut model = Model::default();
    let _ = app.update(Event::Started, &mut model);

    let update = app.update(Event::FavoriteToggled(CharacterId(1)), &mut model);
    assert!(kv_writes(&update.effects).is_empty());
    assert!(!model.favorites.is_favorite(CharacterId(1)));
    assert!(!app.view(&model).favorites_ready);
}

#[test]
fn toggle_writes_full_snapshot() {
    let app = Tester::default();
    let mut model = started(&app);

    let update = app.update(Event::FavoriteToggled(CharacterId(1)), &mut model);
    assert_eq!(
        kv_writes(&update.effects),
        vec![("userdata:favorites".to_string(), br#"{"1":true}"#.to_vec())]
    );

    let update = app.update(Event::FavoriteToggled(CharacterId(3)), &mut model);
    assert_eq!(
        kv_writes(&update.effects),
        vec![("userdata:favorites".to_string(), br#"{"1":true,"3":true}"#.to_vec())]
    );
}

#[test]
fn toggle_pair_restores_state_and_snapshot() {
    let app = Tester::default();
    let mut model = Model::default();
    let _ = app.update(Event::Started, &mut model);
    let _ = app.update(
        Event::FavoritesLoaded(Box::new(Ok(Some(br#"{"2":true}"#.to_vec())))),
        &mut model,
    );
    let before = model.favorites.snapshot();

    let _ = app.update(Event::FavoriteToggled(CharacterId(1)), &mut model);
    let update = app.update(Event::FavoriteToggled(CharacterId(1)), &mut model);

    assert_eq!(model.favorites.snapshot(), before);
    assert_eq!(
        kv_writes(&update.effects),
        vec![("userdata:favorites".to_string(), br#"{"2":true}"#.to_vec())]
    );
}

#[test]
fn stored_favorites_mark_cards() {
    let app = Tester::default();
    let mut model = Model::default();
    let _ = app.update(Event::Started, &mut model);
    let _ = app.update(
        Event::FavoritesLoaded(Box::new(Ok(Some(br#"{"2":true,"3":false}"#.to_vec())))),
        &mut model,
    );
    let _ = deliver_page(&app, &mut model, page(1..5, true));

    let view = app.view(&model);
    let favorites: Vec<bool> = view.cards.iter().map(|c| c.is_favorite).collect();
    assert_eq!(favorites, vec![false, true, false, false]);
    assert_eq!(view.favorite_count, 1);
}

#[test]
fn failed_write_keeps_memory_and_retries_current_snapshot() {
    let app = Tester::default();
    let mut model = started(&app);

    let _ = app.update(Event::FavoriteToggled(CharacterId(7)), &mut model);
    let _ = app.update(
        Event::FavoritesPersisted(Box::new(Err(AppError::new(
            ErrorKind::Storage,
            "disk full",
        )))),
        &mut model,
    );

    assert!(model.favorites.is_favorite(CharacterId(7)));
    let error = app.view(&model).error.expect("write failure is surfaced");
    assert_eq!(error.error_code, "STORAGE_ERROR");
    assert!(error.is_retryable);

    let update = app.update(Event::RetryRequested, &mut model);
    assert_eq!(
        kv_writes(&update.effects),
        vec![("userdata:favorites".to_string(), br#"{"7":true}"#.to_vec())]
    );

    let _ = app.update(Event::FavoritesPersisted(Box::new(Ok(()))), &mut model);
    assert!(app.view(&model).error.is_none());
}

#[test]
fn failed_read_leaves_store_closed_and_retry_reads_again() {
    let app = Tester::default();
    let mut model = Model::default();
    let _ = app.update(Event::Started, &mut model);

    let update = app.update(
        Event::FavoritesLoaded(Box::new(Err(AppError::new(
            ErrorKind::Storage,
            "keychain locked",
        )))),
        &mut model,
    );
    assert_eq!(http_urls(&update.effects).len(), 1);
    assert!(!model.favorites.is_hydrated());

    let update = app.update(Event::FavoriteToggled(CharacterId(1)), &mut model);
    assert!(kv_writes(&update.effects).is_empty());

    let update = app.update(Event::RetryRequested, &mut model);
    assert_eq!(kv_reads(&update.effects), vec!["userdata:favorites".to_string()]);

    let update = app.update(Event::FavoritesLoaded(Box::new(Ok(None))), &mut model);
    assert!(model.favorites.is_hydrated());
    assert!(http_urls(&update.effects).is_empty());
    assert!(app.view(&model).error.is_none());
}

#[test]
fn corrupt_snapshot_starts_empty() {
    let app = Tester::default();
    let mut model = Model::default();
    let _ = app.update(Event::Started, &mut model);
    let _ = app.update(
        Event::FavoritesLoaded(Box::new(Ok(Some(b"{not json".to_vec())))),
        &mut model,
    );

    assert!(model.favorites.is_hydrated());
    assert_eq!(app.view(&model).favorite_count, 0);
}
