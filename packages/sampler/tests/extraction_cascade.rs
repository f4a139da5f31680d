//! Integration tests for listing and detail extraction against markup that
//! only matches fallback locators.

use catalog_sampler::{
    extract::{classify, parse_price},
    CategoryKey, ClassificationMode, DetailExtractor, ListingExtractor, Record, RidingStyle,
    SkillLevel,
};

const BASE: &str = "https://www.evo.com";

/// Redesigned listing: none of the primary `.product-thumb*` classes remain.
const FALLBACK_LISTING: &str = r#"
<html><body>
  <div class="grid">
    <div class="product-tile">
      <a href="/snowboards/lib-tech-orca">
        <h3 class="product-name">Lib Tech Orca Powder Snowboard</h3>
      </a>
      <span class="price">$1,299.00</span>
      <img src="data:image/gif;base64,R0lGOD" data-src="/img/orca.jpg">
    </div>
    <div class="product-tile">
      <a href="https://www.evo.com/snowboards/mystery-board">
        <h3 class="product-name">Mystery Board</h3>
      </a>
      <span class="price">Price not available</span>
    </div>
    <div class="product-tile">
      <span class="price">$99.00</span>
    </div>
  </div>
</body></html>"#;

#[test]
fn test_listing_falls_back_to_later_locators() {
    let page = ListingExtractor::new(BASE).extract_page(FALLBACK_LISTING);

    assert_eq!(page.container_selector.as_deref(), Some(".product-tile"));
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.skipped, 1);

    let orca = &page.items[0];
    assert_eq!(orca.name, "Lib Tech Orca Powder Snowboard");
    assert_eq!(orca.brand.as_deref(), Some("Lib Tech"));
    assert_eq!(orca.price, Some(1299.0));
    assert_eq!(orca.url.as_deref(), Some("https://www.evo.com/snowboards/lib-tech-orca"));
    assert_eq!(orca.image_url.as_deref(), Some("https://www.evo.com/img/orca.jpg"));

    let mystery = &page.items[1];
    assert_eq!(mystery.price, None);
    assert_eq!(mystery.brand.as_deref(), Some("Mystery"));
    assert_eq!(mystery.image_url, None);
}

#[test]
fn test_listing_items_classify_by_mode() {
    let page = ListingExtractor::new(BASE).extract_page(FALLBACK_LISTING);
    let current = CategoryKey::new(SkillLevel::Beginner, RidingStyle::Carving);

    let keyword = page.items[0].classify(ClassificationMode::Keyword, current);
    assert_eq!(keyword, CategoryKey::new(SkillLevel::Intermediate, RidingStyle::Powder));

    let target = page.items[0].classify(ClassificationMode::Target, current);
    assert_eq!(target, current);
}

#[test]
fn test_price_normalization() {
    assert_eq!(parse_price("$1,299.00"), Some(1299.0));
    assert_eq!(parse_price("Price not available"), None);
}

#[test]
fn test_keyword_classification_precedence() {
    assert_eq!(
        classify("Pro Park Twin", None, None),
        CategoryKey::new(SkillLevel::Expert, RidingStyle::Freestyle)
    );
    assert_eq!(
        classify("Plain Board", Some("Forgiving and easy on groomed runs"), None),
        CategoryKey::new(SkillLevel::Beginner, RidingStyle::Carving)
    );
    assert_eq!(
        classify("Plain Board", None, None),
        CategoryKey::new(SkillLevel::Intermediate, RidingStyle::AllMountain)
    );
}

#[test]
fn test_detail_page_with_sparse_markup() {
    let html = r#"
    <html><body>
      <div class="sizes-available">Sizes: 151, 155, 159W, 190</div>
      <div class="pdp-description">
        Surf-inspired shape that floats in deep snow and stays playful on
        the way back to the lift.
      </div>
    </body></html>"#;

    let record = Record::new(
        "2026 Jones Storm Chaser",
        CategoryKey::new(SkillLevel::Advanced, RidingStyle::Powder),
    );
    let enrichment = DetailExtractor::new().extract(html, &record);

    assert_eq!(enrichment.model_year, Some(2026));
    assert_eq!(enrichment.board_lengths, vec![151, 155, 159]);
    assert!(enrichment.description.is_some());
    assert_eq!(enrichment.terrain, vec!["powder".to_string()]);
    assert_eq!(enrichment.review_count, None);

    let merged = record.merged_with(&enrichment);
    assert_eq!(merged.id, record.id);
    assert_eq!(merged.category, record.category);
    assert_eq!(merged.board_lengths, vec![151, 155, 159]);
}
