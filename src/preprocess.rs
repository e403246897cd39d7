use std::sync::LazyLock;

use regex::Regex;

static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?\S+|www\S+").expect("valid url regex"));
static MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[@#](\w+)").expect("valid marker regex"));
// letters (ASCII + lower-case Latin-1), digits, whitespace and . , ! ?
static UNSUPPORTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^a-z0-9\u{DF}-\u{F6}\u{F8}-\u{FF}\s.,!?]").expect("valid charset regex")
});

///Normalizes scraped text before any other stage sees it.
///Lower-cases, removes URLs, unwraps `@handle`/`#tag` to the bare word, drops unsupported
///characters and collapses whitespace. Applying it twice yields the same text.
/// # Example
/// ```
/// use trend_analysis::normalize;
/// let clean = normalize("Check https://t.co/x #Viral   @Budi!!");
/// assert_eq!(clean, "check viral budi!!");
/// ```
pub fn normalize(text: &str) -> String {
    if text.trim().is_empty() {
        return String::new();
    }
    let lowered = text.to_lowercase();
    let no_urls = URL.replace_all(&lowered, "");
    let unwrapped = MARKER.replace_all(&no_urls, "$1");
    let filtered = UNSUPPORTED.replace_all(&unwrapped, "");
    // dropping characters can glue a new "http..." run together
    let filtered = URL.replace_all(&filtered, "");
    filtered.split_whitespace().collect::<Vec<&str>>().join(" ")
}
