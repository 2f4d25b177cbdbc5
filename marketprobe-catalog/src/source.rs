//! Page source abstraction.

use marketprobe_core::Params;
use marketprobe_fetch::{FetchReport, RequestClient};

/// Something that can fetch one API endpoint.
///
/// [`RequestClient`] is the production implementation. The paginator only
/// depends on this trait so its stopping rules can be tested without any
/// HTTP machinery.
pub trait PageSource {
    /// Fetches `endpoint` with `params`, never failing.
    fn fetch_page(&mut self, endpoint: &str, params: &Params) -> FetchReport;
}

impl PageSource for RequestClient {
    fn fetch_page(&mut self, endpoint: &str, params: &Params) -> FetchReport {
        let attempts = self.config().max_retries();
        self.fetch_detailed(endpoint, params, attempts)
    }
}

impl<S: PageSource + ?Sized> PageSource for &mut S {
    fn fetch_page(&mut self, endpoint: &str, params: &Params) -> FetchReport {
        (**self).fetch_page(endpoint, params)
    }
}
