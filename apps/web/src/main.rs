mod animation;
mod fetch;
mod state;
mod storage;
mod ui;

use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use ip_tracker_core::machine::TransitionError;
use ip_tracker_core::{Effect, LookupError, LookupEvent, LookupRecord, RequestId, TrackerConfig};
use ratzilla::ratatui::Terminal;
use ratzilla::{DomBackend, WebRenderer};
use state::{viewport_for, WebApp};
use wasm_bindgen_futures::spawn_local;

/// Baked in at build time: `GEO_API_KEY=... trunk build`.
const API_KEY: Option<&str> = option_env!("GEO_API_KEY");
const MOBILE_QUERY: &str = "(max-width: 992px)";

type Outcomes = Rc<RefCell<Vec<(RequestId, Result<LookupRecord, LookupError>)>>>;

fn main() -> io::Result<()> {
    let config = TrackerConfig {
        api_key: API_KEY.unwrap_or_default().to_string(),
        ..TrackerConfig::default()
    };
    if config.api_key.is_empty() {
        web_sys::console::warn_1(&"GEO_API_KEY was not set at build time".into());
    }

    let fallback = config.default_ip.clone();
    let app = Rc::new(RefCell::new(WebApp::new(config)));
    let outcomes: Outcomes = Rc::new(RefCell::new(Vec::new()));

    let startup = app
        .borrow_mut()
        .startup(storage::load_last_query(&fallback), now_seconds());
    run_effects(&app, &outcomes, startup);

    let backend = DomBackend::new()?;
    let mut terminal = Terminal::new(backend)?;

    terminal.on_key_event({
        let app = app.clone();
        let outcomes = outcomes.clone();
        move |event| {
            let effects = app.borrow_mut().handle_key(event.code, now_seconds());
            run_effects(&app, &outcomes, effects);
        }
    });

    terminal.draw_web(move |f| {
        let now = now_seconds();

        let finished = std::mem::take(&mut *outcomes.borrow_mut());
        for (request, result) in finished {
            if let Err(error) = &result {
                web_sys::console::error_1(&format!("Lookup {request} failed: {error}").into());
            }
            let effects = app
                .borrow_mut()
                .dispatch(LookupEvent::Resolved { request, result }, now);
            run_effects(&app, &outcomes, effects);
        }

        let mut state = app.borrow_mut();
        state.tick(now);
        let viewport = viewport_for(
            window_width(),
            is_mobile(),
            state.tracker.config().mobile_breakpoint,
            ui::map_rows(f.area()),
        );
        if viewport != state.tracker.map().viewport() {
            state.tracker.map_mut().set_viewport(viewport);
        }
        ui::render(&state, f);
    });

    Ok(())
}

/// Persists and fetches on behalf of the controller. Results land in
/// `outcomes` and are applied by the next draw.
fn run_effects(
    app: &Rc<RefCell<WebApp>>,
    outcomes: &Outcomes,
    effects: Result<Vec<Effect>, TransitionError>,
) {
    let effects = match effects {
        Ok(effects) => effects,
        Err(error) => {
            web_sys::console::warn_1(&error.to_string().into());
            return;
        }
    };

    for effect in effects {
        match effect {
            Effect::Persist(query) => storage::save_last_query(&query),
            Effect::Fetch(request) => {
                let url = app.borrow().tracker.config().lookup_url(&request.address);
                let outcomes = outcomes.clone();
                spawn_local(async move {
                    let result = match url {
                        Ok(url) => fetch::fetch_location(url.into()).await,
                        Err(error) => Err(error),
                    };
                    outcomes.borrow_mut().push((request.id, result));
                });
            }
        }
    }
}

fn now_seconds() -> f64 {
    js_sys::Date::now() / 1000.0
}

fn window_width() -> f64 {
    web_sys::window()
        .and_then(|window| window.inner_width().ok())
        .and_then(|width| width.as_f64())
        .unwrap_or(1280.0)
}

fn is_mobile() -> bool {
    web_sys::window()
        .and_then(|window| window.match_media(MOBILE_QUERY).ok().flatten())
        .is_some_and(|query| query.matches())
}
