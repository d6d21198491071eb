//! Documents shared by the integration tests.

use sidetoc::InMemoryDocument;
use sidetoc_types::Viewport;

/// Title, then `(level, text)` headings stacked 300px apart in a 400px
/// viewport.
pub fn document(title: &str, url: &str, headings: &[(u8, &str)]) -> InMemoryDocument {
    let doc = InMemoryDocument::new(title, url);
    doc.set_viewport(Viewport::new(400.0));
    for (level, text) in headings {
        doc.append_heading(*level, text);
    }
    doc
}

pub fn guide() -> InMemoryDocument {
    document(
        "Guide",
        "https://docs.test/guide",
        &[(1, "Guide"), (2, "Setup"), (3, "Install"), (2, "Usage")],
    )
}

pub fn changelog() -> InMemoryDocument {
    document(
        "Changelog",
        "https://docs.test/changelog",
        &[(2, "1.0"), (2, "0.9")],
    )
}

pub const GUIDE_XHTML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<html xmlns="http://www.w3.org/1999/xhtml">
  <head><title>Field Guide</title></head>
  <body>
    <h1>Field Guide</h1>
    <p>Welcome.</p>
    <h2>Setup</h2>
    <p>Install the tools first.</p>
    <h3 id="install">Install</h3>
    <p>Run the installer.</p>
    <h2>Setup</h2>
    <h2>   </h2>
    <h2>Usage &amp; Tips</h2>
  </body>
</html>
"#;
