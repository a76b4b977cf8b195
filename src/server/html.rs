//! HTML page templating for status responses.
//!
//! Out of scope per §1: this is "an external collaborator". The core
//! only depends on the [`StatusPage`] contract (render a reason phrase
//! into a full HTML document); [`DefaultStatusPage`] is the bundled
//! implementation, grounded on the page template documented in §6.

/// Renders the body of a prebuilt status response.
pub trait StatusPage: Send + Sync {
    fn render(&self, reason: &str) -> Vec<u8>;
}

/// The bundled page template (§6 "Collaborator-provided HTML helper").
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultStatusPage;

impl StatusPage for DefaultStatusPage {
    fn render(&self, reason: &str) -> Vec<u8> {
        format!(
            "<!DOCTYPE html><html><head><title>Dan's hosted site</title>\
             <style>body{{background-color:#e6f2ff}}\
             h1{{font-size:32;text-align:center;color:black;}}</style></head>\
             <body><h1>{}</h1></body></html>",
            reason,
        ).into_bytes()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn renders_reason_into_h1() {
        let page = DefaultStatusPage.render("404 Not Found");
        let text = String::from_utf8(page).unwrap();
        assert!(text.contains("<h1>404 Not Found</h1>"));
        assert!(text.starts_with("<!DOCTYPE html>"));
    }
}
