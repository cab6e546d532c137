//! Fixed demo test cases used when the backend reports success but sends no
//! `tests` array. Only consulted when `Features::mock_fallback` is on.

use crate::{InputSource, TestCase};

pub fn demo_tests(source: InputSource) -> Vec<TestCase> {
    let rows: &[(&str, &str, &str, &str, &str)] = match source {
        InputSource::Figma => &[
            (
                "Button Click Test",
                "Verify that the primary button is clickable and triggers the expected action",
                "UI Interaction",
                ".btn-primary",
                "High",
            ),
            (
                "Form Validation Test",
                "Check that form validation works correctly for required fields",
                "Form Validation",
                "form input[required]",
                "High",
            ),
            (
                "Responsive Design Test",
                "Ensure the design is responsive across different screen sizes",
                "Responsive",
                ".responsive-container",
                "Medium",
            ),
            (
                "Color Contrast Test",
                "Verify that color contrast meets accessibility standards",
                "Accessibility",
                "*",
                "Medium",
            ),
        ],
        InputSource::Document => &[
            (
                "User Registration Flow",
                "Test the complete user registration process as described in requirements",
                "User Flow",
                ".registration-form",
                "High",
            ),
            (
                "Data Validation Test",
                "Verify that data validation rules match the documented specifications",
                "Data Validation",
                "input[data-validation]",
                "High",
            ),
            (
                "API Integration Test",
                "Test API endpoints as documented in the specification",
                "API Testing",
                ".api-endpoint",
                "High",
            ),
            (
                "Business Rules Test",
                "Validate business logic according to SRS document",
                "Business Logic",
                ".business-logic",
                "Medium",
            ),
        ],
        InputSource::Manual => &[
            (
                "Custom Feature Test",
                "Test the custom features described in the manual prompt",
                "Custom",
                ".custom-feature",
                "High",
            ),
            (
                "User Interaction Test",
                "Verify user interactions work as specified",
                "User Interaction",
                ".interactive-element",
                "High",
            ),
            (
                "Edge Case Test",
                "Test edge cases mentioned in requirements",
                "Edge Case",
                ".edge-case",
                "Medium",
            ),
        ],
        InputSource::Website => &[
            (
                "Navigation Test",
                "Verify that all navigation links work correctly",
                "Navigation",
                "nav a",
                "High",
            ),
            (
                "Page Load Test",
                "Check that all pages load within acceptable time limits",
                "Performance",
                "body",
                "High",
            ),
            (
                "Contact Form Test",
                "Test contact form submission and validation",
                "Form Testing",
                ".contact-form",
                "Medium",
            ),
            (
                "Search Functionality Test",
                "Verify search features work as expected",
                "Search",
                ".search-form",
                "Medium",
            ),
            (
                "Mobile Responsiveness Test",
                "Test website responsiveness on mobile devices",
                "Responsive",
                "body",
                "High",
            ),
        ],
    };

    rows.iter()
        .zip(1..)
        .map(|(&(name, description, kind, selector, priority), id)| {
            TestCase::new(id, name)
                .with_description(description)
                .with_kind(kind)
                .with_selector(selector)
                .with_priority(priority)
        })
        .collect()
}
