//! Listing URL builder
//!
//! Turns a [`SearchQuery`] into the catalog site's listing URL. The path
//! segment order is dictated by the site: make, then model, with the `new`
//! segment slotted after the most specific name and an `all` segment closing
//! incomplete paths. Every listing URL ends with the `ph=1&unsold=1` pair
//! that restricts results to photographed, still-available ads.

use crate::domain::search::SearchQuery;

/// Catalog origin all listing pages live under.
pub const CATALOG_ORIGIN: &str = "https://auto.drom.ru/";

const NEW_SEGMENT: &str = "new";

/// Builds the listing URL for a full search query.
pub fn listing_url_for_query(query: &SearchQuery) -> String {
    let mut url = String::from(CATALOG_ORIGIN);

    match (query.make.is_empty(), query.model.is_empty()) {
        (true, _) => {
            if query.new_only {
                url.push_str(NEW_SEGMENT);
                url.push('/');
            }
            url.push_str("all/");
        }
        (false, true) => {
            url.push_str(&query.make);
            url.push('/');
            if query.new_only {
                url.push_str(NEW_SEGMENT);
                url.push_str("/all/");
            }
        }
        (false, false) => {
            url.push_str(&query.make);
            url.push('/');
            url.push_str(&query.model);
            url.push('/');
            if query.new_only {
                url.push_str(NEW_SEGMENT);
                url.push('/');
            }
        }
    }

    let mut params: Vec<String> = Vec::new();
    push_param(&mut params, "minprice", &query.min_price);
    push_param(&mut params, "maxprice", &query.max_price);
    push_param(&mut params, "minyear", &query.min_year);
    push_param(&mut params, "maxyear", &query.max_year);

    match query.gearbox.as_str() {
        "" => {}
        // The site models "any automatic" as two distinct transmission codes.
        "AT" => {
            params.push("transmission[]=2".to_string());
            params.push("transmission[]=5".to_string());
        }
        code => params.push(format!("transmission[]={code}")),
    }

    push_param(&mut params, "fueltype", &query.fuel);
    push_param(&mut params, "privod", &query.drive);
    params.push("ph=1".to_string());
    params.push("unsold=1".to_string());

    format!("{url}?{}", params.join("&"))
}

/// Builds the listing URL for one make constrained only by price.
pub fn listing_url_for_make(make: &str, min_price: &str, max_price: &str) -> String {
    let mut params: Vec<String> = Vec::new();
    push_param(&mut params, "minprice", min_price);
    push_param(&mut params, "maxprice", max_price);
    params.push("ph=1".to_string());
    params.push("unsold=1".to_string());

    format!("{CATALOG_ORIGIN}{make}/all/?{}", params.join("&"))
}

fn push_param(params: &mut Vec<String>, key: &str, value: &str) {
    if !value.is_empty() {
        params.push(format!("{key}={value}"));
    }
}
