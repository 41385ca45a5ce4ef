//! End-to-end pipeline over a realistic upstream payload: raw shopping
//! results through the drop rule, normalization, and intent filtering.

use serpapi_client::SearchResponse;
use shopwizz_common::Filters;
use shopwizz_core::{apply_filters, normalize_item, parse_intent_reply};
use shopwizz_core::normalize::is_usable;

const UPSTREAM_BODY: &str = r#"{
  "search_metadata": {"status": "Success"},
  "shopping_results": [
    {
      "position": 1,
      "product_id": "918273645",
      "title": "Trail Runner Pro Cat Toy",
      "source": "Chewy",
      "price": "$18.99",
      "extracted_price": 18.99,
      "rating": 4.6,
      "reviews": 1243,
      "thumbnail": "https://img.example/cat-toy.jpg",
      "delivery": "Free delivery",
      "product_link": "https://chewy.example/cat-toy",
      "extensions": ["Frisco"]
    },
    {
      "position": 2,
      "title": "Catnip Chaser Wand",
      "source": "PetSmart",
      "price": "$24.50",
      "extracted_price": 24.5,
      "rating": 3.8,
      "reviews": 87,
      "thumbnail": "https://img.example/wand.jpg",
      "product_link": "https://petsmart.example/wand"
    },
    {
      "position": 3,
      "title": "No Picture Cat Toy",
      "extracted_price": 9.99
    },
    {
      "position": 4,
      "title": "No Price Cat Toy",
      "thumbnail": "https://img.example/nothing.jpg"
    },
    {
      "position": 5,
      "title": "Bear Plush"
    }
  ]
}"#;

fn run_pipeline(filters: &Filters) -> Vec<shopwizz_common::Product> {
    let response: SearchResponse = serde_json::from_str(UPSTREAM_BODY).unwrap();
    let products: Vec<_> = response
        .shopping_results
        .iter()
        .filter(|item| is_usable(item))
        .enumerate()
        .map(|(idx, item)| normalize_item(item, idx))
        .collect();
    apply_filters(products, filters)
}

#[test]
fn items_without_price_or_thumbnail_never_reach_the_output() {
    let products = run_pipeline(&Filters::new());
    let titles: Vec<&str> = products.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["Trail Runner Pro Cat Toy", "Catnip Chaser Wand"]);
}

#[test]
fn synthesized_ids_use_the_post_drop_index() {
    let products = run_pipeline(&Filters::new());
    // first product keeps its upstream id; second has none and gets index 1
    assert_eq!(products[0].product_id, "918273645");
    assert_eq!(products[1].product_id, "CatnipChaserWand_24.5_1");
}

#[test]
fn model_reply_filters_drive_the_product_subset() {
    let reply = "{\"keywords\":\"cat toy\",\"filters\":{\"rating\":\">=4\",\"store\":\"chewy\"}}\nHere are highly rated cat toys at Chewy.";
    let parsed = parse_intent_reply(reply).unwrap();
    assert_eq!(parsed.reply_text, "Here are highly rated cat toys at Chewy.");

    let products = run_pipeline(&parsed.intent.filters);
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].title, "Trail Runner Pro Cat Toy");
    assert_eq!(products[0].store.as_deref(), Some("Chewy"));
}

#[test]
fn word_boundary_filters_apply_to_normalized_titles() {
    let filters: Filters = serde_json::from_str(r#"{"animal":"cat"}"#).unwrap();
    let products = run_pipeline(&filters);
    // "Catnip Chaser Wand" fails the word boundary; "... Cat Toy" passes
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].title, "Trail Runner Pro Cat Toy");
}

#[test]
fn price_cap_filters_on_extracted_price() {
    let filters: Filters = serde_json::from_str(r#"{"priceMax": 20}"#).unwrap();
    let products = run_pipeline(&filters);
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].prices, vec!["$18.99"]);
}
