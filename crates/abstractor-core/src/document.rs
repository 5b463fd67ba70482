/// Plain text of a decoded PDF, one entry per physical page.
///
/// Pages are stored 0-indexed but looked up 1-indexed, matching how page
/// numbers are cited in summaries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageText {
    pages: Vec<String>,
}

impl PageText {
    pub fn new(pages: Vec<String>) -> Self {
        Self { pages }
    }

    pub fn num_pages(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Text of the 1-indexed page `page_number`, or `""` when out of range.
    pub fn page_text(&self, page_number: usize) -> &str {
        page_number
            .checked_sub(1)
            .and_then(|i| self.pages.get(i))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// All pages joined with `\n`, in page order.
    pub fn all_text(&self) -> String {
        self.pages.join("\n")
    }

    pub fn pages(&self) -> &[String] {
        &self.pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> PageText {
        PageText::new(vec!["one".into(), "two".into(), "three".into()])
    }

    #[test]
    fn page_lookup_is_one_indexed() {
        let d = doc();
        assert_eq!(d.page_text(1), "one");
        assert_eq!(d.page_text(3), "three");
    }

    #[test]
    fn out_of_range_page_is_empty() {
        let d = doc();
        assert_eq!(d.page_text(0), "");
        assert_eq!(d.page_text(4), "");
        assert_eq!(PageText::default().page_text(1), "");
    }

    #[test]
    fn all_text_joins_with_newlines() {
        assert_eq!(doc().all_text(), "one\ntwo\nthree");
        assert_eq!(PageText::default().all_text(), "");
    }
}
