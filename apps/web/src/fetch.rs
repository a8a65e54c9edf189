use ip_tracker_core::record::GeoResponse;
use ip_tracker_core::{LookupError, LookupRecord};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

/// One cross-origin GET to the geolocation provider.
pub async fn fetch_location(url: String) -> Result<LookupRecord, LookupError> {
    let window = web_sys::window().ok_or_else(|| LookupError::Transport("no window".into()))?;

    let opts = RequestInit::new();
    opts.set_method("GET");
    opts.set_mode(RequestMode::Cors);

    let request = Request::new_with_str_and_init(&url, &opts).map_err(transport)?;

    let response_value = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(transport)?;
    let response = response_value.dyn_into::<Response>().map_err(transport)?;

    if !response.ok() {
        return Err(LookupError::Status(response.status()));
    }

    let json = JsFuture::from(response.json().map_err(decode)?)
        .await
        .map_err(decode)?;

    serde_wasm_bindgen::from_value::<GeoResponse>(json)
        .map(LookupRecord::from)
        .map_err(|error| LookupError::Decode(error.to_string()))
}

fn transport(value: JsValue) -> LookupError {
    LookupError::Transport(format!("{value:?}"))
}

fn decode(value: JsValue) -> LookupError {
    LookupError::Decode(format!("{value:?}"))
}
