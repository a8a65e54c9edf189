use ip_tracker_core::storage::{encode_last_query, resolve_last_query, LAST_QUERY_KEY};
use ip_tracker_core::Ipv4Query;

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

/// The remembered address, or `fallback` when nothing usable is stored.
pub fn load_last_query(fallback: &str) -> String {
    let raw = local_storage().and_then(|storage| storage.get_item(LAST_QUERY_KEY).ok().flatten());

    match resolve_last_query(raw.as_deref(), fallback) {
        Ok(address) => address,
        Err(error) => {
            web_sys::console::warn_1(
                &format!("Ignoring stored {LAST_QUERY_KEY:?} value: {error}").into(),
            );
            fallback.to_string()
        }
    }
}

pub fn save_last_query(query: &Ipv4Query) {
    let Some(storage) = local_storage() else {
        web_sys::console::warn_1(&"localStorage is unavailable, not remembering query".into());
        return;
    };

    if storage
        .set_item(LAST_QUERY_KEY, &encode_last_query(query))
        .is_err()
    {
        web_sys::console::warn_1(&format!("Failed to remember {query}").into());
    }
}
