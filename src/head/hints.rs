//! Display hints for header elements.

/// Short human-readable label for a header element.
///
/// `scope` is the name of the containing element; it distinguishes, for
/// example, a book's author from the author of the FictionBook file.
/// Unknown pairs fall back to the scope-free entry, then to `""`.
pub fn hint(name: &str, scope: &str) -> &'static str {
    match (name, scope) {
        ("author", "document-info") => "File author",
        ("date", "document-info") => "File date",
        ("id", "document-info") => "File ID",
        ("publisher", "document-info") => "Copyright owner",
        ("publisher", "publish-info") => "Publisher",
        ("sequence", "publish-info") => "Publisher series",
        ("title-info", _) => "Book",
        ("src-title-info", _) => "Original book",
        ("document-info", _) => "File",
        ("publish-info", _) => "Publish",
        ("custom-info", _) => "Add-on",
        ("genre", _) => "Genre",
        ("author", _) => "Author",
        ("book-title", _) => "Title",
        ("annotation", _) => "Annotation",
        ("keywords", _) => "Keywords",
        ("coverpage", _) => "Cover",
        ("image", _) => "Image",
        ("date", _) => "Date",
        ("lang", _) => "Language",
        ("src-lang", _) => "Original",
        ("translator", _) => "Translator",
        ("sequence", _) => "Sequence",
        ("first-name", _) => "First name",
        ("middle-name", _) => "Middle name",
        ("last-name", _) => "Last name",
        ("nickname", _) => "Nickname",
        ("home-page", _) => "Home page",
        ("email", _) => "E-mail",
        ("id", _) => "ID",
        ("program-used", _) => "Program",
        ("src-url", _) => "Source URL",
        ("src-ocr", _) => "Scanned by",
        ("version", _) => "Version",
        ("history", _) => "History",
        ("book-name", _) => "Book name",
        ("publisher", _) => "Publisher",
        ("city", _) => "City",
        ("year", _) => "Year",
        ("isbn", _) => "ISBN",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scoped_hint() {
        assert_eq!(hint("author", "title-info"), "Author");
        assert_eq!(hint("author", "document-info"), "File author");
        assert_eq!(hint("author", ""), "Author");
    }

    #[test]
    fn test_unknown_hint() {
        assert_eq!(hint("stylesheet", "description"), "");
    }
}
