//! Small DOM traversal helpers shared by the parsers.

use scraper::ElementRef;

/// Concatenated text content of an element.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}

/// Next sibling that is an element, skipping text nodes.
pub(crate) fn next_element<'a>(element: ElementRef<'a>) -> Option<ElementRef<'a>> {
    element.next_siblings().find_map(ElementRef::wrap)
}

/// Previous sibling that is an element, skipping text nodes.
pub(crate) fn prev_element<'a>(element: ElementRef<'a>) -> Option<ElementRef<'a>> {
    element.prev_siblings().find_map(ElementRef::wrap)
}

/// Parent element, if the parent node is an element.
pub(crate) fn parent_element<'a>(element: ElementRef<'a>) -> Option<ElementRef<'a>> {
    element.parent().and_then(ElementRef::wrap)
}
