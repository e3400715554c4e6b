use scraper::Html;

pub(crate) fn parse_html_text(text: &str) -> Html {
    Html::parse_document(text)
}

#[track_caller]
pub(crate) fn assert_valid_html(html: &Html) {
    assert!(
        html.errors.is_empty(),
        "Got HTML parsing errors: {:?}",
        html.errors
    );
}
