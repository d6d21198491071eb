/// Access to the page's current URL.
///
/// Hosts that can observe history navigation call the page session directly
/// when the URL changes; this trait backs the polling fallback for
/// navigations that are not otherwise observable.
pub trait NavigationSource {
    fn current_url(&self) -> String;
}
