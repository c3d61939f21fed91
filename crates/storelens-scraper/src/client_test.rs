use super::*;

#[test]
fn products_url_first_page() {
    let url = StorefrontClient::products_url(
        "https://shop.example.com/collections/all",
        250,
        &PageCursor::First,
    )
    .unwrap();
    assert_eq!(url, "https://shop.example.com/products.json?limit=250");
}

#[test]
fn products_url_with_page_info_cursor() {
    let url = StorefrontClient::products_url(
        "https://shop.example.com",
        250,
        &PageCursor::PageInfo("eyJsYXN0X2lkIjo2fQ".to_string()),
    )
    .unwrap();
    assert_eq!(
        url,
        "https://shop.example.com/products.json?limit=250&page_info=eyJsYXN0X2lkIjo2fQ"
    );
}

#[test]
fn products_url_with_page_number() {
    let url = StorefrontClient::products_url(
        "https://shop.example.com/",
        250,
        &PageCursor::PageNumber(3),
    )
    .unwrap();
    assert_eq!(url, "https://shop.example.com/products.json?limit=250&page=3");
}

#[test]
fn products_url_rejects_invalid_origin() {
    let err = StorefrontClient::products_url("not-a-url", 250, &PageCursor::First).unwrap_err();
    assert!(
        matches!(err, ScraperError::InvalidShopUrl { .. }),
        "expected InvalidShopUrl, got: {err:?}"
    );
}

#[test]
fn normalize_defaults_scheme_to_https() {
    assert_eq!(
        normalize_target_address("shop.example.com").unwrap(),
        "https://shop.example.com"
    );
}

#[test]
fn normalize_lowercases_host_and_drops_path() {
    assert_eq!(
        normalize_target_address("  HTTPS://Shop.Example.com/collections/all?x=1#top ").unwrap(),
        "https://shop.example.com"
    );
}

#[test]
fn normalize_keeps_explicit_http_and_port() {
    assert_eq!(
        normalize_target_address("http://127.0.0.1:8080/").unwrap(),
        "http://127.0.0.1:8080"
    );
}

#[test]
fn normalize_rejects_empty_and_foreign_schemes() {
    assert!(matches!(
        normalize_target_address("   "),
        Err(ScraperError::InvalidShopUrl { .. })
    ));
    assert!(matches!(
        normalize_target_address("ftp://shop.example.com"),
        Err(ScraperError::InvalidShopUrl { .. })
    ));
}

#[test]
fn extract_store_origin_strips_path() {
    assert_eq!(
        extract_store_origin("https://shop.example.com/collections/all"),
        "https://shop.example.com"
    );
}

#[test]
fn absolutize_resolves_relative_and_drops_fragment() {
    assert_eq!(
        absolutize_url("https://shop.example.com", "/pages/faq#shipping").as_deref(),
        Some("https://shop.example.com/pages/faq")
    );
    assert_eq!(
        absolutize_url("https://shop.example.com", "//cdn.example.com/a.png?v=1&amp;w=2")
            .as_deref(),
        Some("https://cdn.example.com/a.png?v=1&w=2")
    );
}

#[test]
fn absolutize_rejects_non_http_schemes() {
    assert!(absolutize_url("https://shop.example.com", "mailto:hi@shop.example.com").is_none());
    assert!(absolutize_url("https://shop.example.com", "javascript:void(0)").is_none());
    assert!(absolutize_url("https://shop.example.com", "").is_none());
}

#[test]
fn host_matches_domain_and_subdomains_only() {
    assert!(host_matches("instagram.com", "instagram.com"));
    assert!(host_matches("www.instagram.com", "instagram.com"));
    assert!(!host_matches("notinstagram.com", "instagram.com"));
    assert!(!host_matches("box.com", "x.com"));
}

#[test]
fn page_success_body_maps_statuses() {
    let ok = Page {
        url: "https://shop.example.com".to_string(),
        status: 200,
        body: "<html></html>".to_string(),
    };
    assert_eq!(ok.success_body().unwrap(), "<html></html>");

    let missing = Page {
        status: 404,
        ..ok.clone()
    };
    assert!(matches!(
        missing.success_body(),
        Err(ScraperError::NotFound { .. })
    ));

    let blocked = Page { status: 403, ..ok };
    assert!(matches!(
        blocked.success_body(),
        Err(ScraperError::UnexpectedStatus { status: 403, .. })
    ));
}
