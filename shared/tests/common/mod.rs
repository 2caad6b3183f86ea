#![allow(dead_code)]

use std::ops::Range;

use catalog_core::capabilities::DelayOperation;
use catalog_core::{App, Character, CharacterId, CharacterPage, Effect, Event, Model, PageInfo};
use crux_core::capability::Operation;
use crux_core::testing::{AppTester, Update};
use crux_core::Request;
use crux_http::protocol::HttpRequest;
use crux_kv::KeyValueOperation;

pub type Tester = AppTester<App, Effect>;

pub fn character(id: u32, name: &str) -> Character {
    Character {
        id: CharacterId(id),
        name: name.to_string(),
        image: format!("https://rickandmortyapi.com/api/character/avatar/{id}.jpeg"),
        species: "Human".into(),
        status: "Alive".into(),
        gender: "Male".into(),
        kind: Some(String::new()),
        origin: None,
        location: None,
        episode: Vec::new(),
        url: format!("https://rickandmortyapi.com/api/character/{id}"),
        created: String::new(),
    }
}

pub fn page(ids: Range<u32>, has_next: bool) -> CharacterPage {
    CharacterPage {
        info: PageInfo {
            count: 826,
            pages: 42,
            next: has_next.then(|| "https://rickandmortyapi.com/api/character?page=next".to_string()),
            prev: None,
        },
        results: ids.map(|id| character(id, &format!("Character {id}"))).collect(),
    }
}

/// Started core with an empty favorites store and page 1 in flight.
pub fn started(app: &Tester) -> Model {
    let mut model = Model::default();
    let _ = app.update(Event::Started, &mut model);
    let _ = app.update(Event::FavoritesLoaded(Box::new(Ok(None))), &mut model);
    model
}

/// Started core with the first page of twenty characters loaded.
pub fn browsing(app: &Tester) -> Model {
    let mut model = started(app);
    let _ = deliver_page(app, &mut model, page(1..21, true));
    model
}

pub fn deliver_page(app: &Tester, model: &mut Model, page: CharacterPage) -> Update<Effect, Event> {
    let ticket = model
        .listing
        .in_flight()
        .expect("a page fetch should be in flight");
    app.update(
        Event::PageFetched {
            ticket,
            outcome: Box::new(Ok(page)),
        },
        model,
    )
}

pub fn http_urls(effects: &[Effect]) -> Vec<String> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::Http(request) => Some(request.operation.url.clone()),
            _ => None,
        })
        .collect()
}

pub fn kv_reads(effects: &[Effect]) -> Vec<String> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::KeyValue(request) => match &request.operation {
                KeyValueOperation::Get { key } => Some(key.clone()),
                _ => None,
            },
            _ => None,
        })
        .collect()
}

pub fn kv_writes(effects: &[Effect]) -> Vec<(String, Vec<u8>)> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::KeyValue(request) => match &request.operation {
                KeyValueOperation::Set { key, value, .. } => Some((key.clone(), value.clone())),
                _ => None,
            },
            _ => None,
        })
        .collect()
}

/// Answers `request` the way a shell would and feeds the single resulting
/// event back into the core.
pub fn answer<Op: Operation>(
    app: &Tester,
    model: &mut Model,
    request: &mut Request<Op>,
    output: Op::Output,
) -> Update<Effect, Event> {
    let update = app.resolve(request, output).expect("request should resolve");
    let mut events = update.events.into_iter();
    let event = events.next().expect("response should produce an event");
    assert!(events.next().is_none());
    app.update(event, model)
}

pub fn http_requests(effects: Vec<Effect>) -> Vec<Request<HttpRequest>> {
    effects
        .into_iter()
        .filter_map(|effect| match effect {
            Effect::Http(request) => Some(request),
            _ => None,
        })
        .collect()
}

pub fn kv_requests(effects: Vec<Effect>) -> Vec<Request<KeyValueOperation>> {
    effects
        .into_iter()
        .filter_map(|effect| match effect {
            Effect::KeyValue(request) => Some(request),
            _ => None,
        })
        .collect()
}

pub fn delay_requests(effects: Vec<Effect>) -> Vec<Request<DelayOperation>> {
    effects
        .into_iter()
        .filter_map(|effect| match effect {
            Effect::Delay(request) => Some(request),
            _ => None,
        })
        .collect()
}

pub fn renders(effects: &[Effect]) -> bool {
    effects.iter().any(|effect| matches!(effect, Effect::Render(_)))
}
