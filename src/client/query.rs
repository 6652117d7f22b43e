use std::collections::BTreeMap;
use std::fmt;

/// Diet restriction understood by the search endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Diet {
    Vegan,
    Vegetarian,
}

impl Diet {
    pub fn as_str(&self) -> &'static str {
        match self {
            Diet::Vegan => "vegan",
            Diet::Vegetarian => "vegetarian",
        }
    }
}

impl fmt::Display for Diet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Intolerance understood by the search endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intolerance {
    Gluten,
    Sugar,
}

impl Intolerance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intolerance::Gluten => "gluten",
            Intolerance::Sugar => "sugar",
        }
    }
}

impl fmt::Display for Intolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const DIET_KEY: &str = "diet";
pub const INTOLERANCES_KEY: &str = "intolerances";

/// Builder for the key/value filters forwarded to the search endpoint.
///
/// Filters are never applied locally; they are sent verbatim as query
/// parameters. Keys are unique, so each appears once in the request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    params: BTreeMap<String, String>,
    intolerances: Vec<Intolerance>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the diet, replacing any previous one.
    pub fn diet(mut self, diet: Diet) -> Self {
        self.params.insert(DIET_KEY.to_string(), diet.to_string());
        self
    }

    /// Adds an intolerance. Adding the same intolerance twice has no effect.
    pub fn intolerance(mut self, intolerance: Intolerance) -> Self {
        if !self.intolerances.contains(&intolerance) {
            self.intolerances.push(intolerance);
        }
        self
    }

    /// Sets an arbitrary pass-through parameter.
    pub fn raw(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Returns the filters as the map sent to the API.
    ///
    /// Intolerances are comma-joined in the order they were added. A raw
    /// `intolerances` value is merged in front of the typed ones, each value
    /// kept once.
    pub fn into_map(self) -> BTreeMap<String, String> {
        let mut params = self.params;
        if self.intolerances.is_empty() {
            return params;
        }
        let mut values: Vec<&str> = Vec::new();
        let raw = params.remove(INTOLERANCES_KEY).unwrap_or_default();
        let typed = self.intolerances.iter().map(|i| i.as_str());
        for value in raw.split(',').map(str::trim).chain(typed) {
            if !value.is_empty() && !values.contains(&value) {
                values.push(value);
            }
        }
        params.insert(INTOLERANCES_KEY.to_string(), values.join(","));
        params
    }
}

/// What to search for: ingredient terms plus pass-through filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub ingredients: Vec<String>,
    pub filters: BTreeMap<String, String>,
}

impl SearchQuery {
    pub fn new(ingredients: Vec<String>, filters: BTreeMap<String, String>) -> Self {
        SearchQuery {
            ingredients,
            filters,
        }
    }

    /// Returns the comma-joined ingredient term, or `None` when there are no
    /// usable ingredients.
    pub(crate) fn ingredient_term(&self) -> Option<String> {
        let terms: Vec<&str> = self
            .ingredients
            .iter()
            .map(|i| i.trim())
            .filter(|i| !i.is_empty())
            .collect();
        if terms.is_empty() {
            None
        } else {
            Some(terms.join(","))
        }
    }
}

/// Splits a comma-separated ingredient entry into trimmed terms.
///
/// Empty terms (e.g. from `"egg,,milk"` or a trailing comma) are dropped.
pub fn parse_ingredients(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// A page window of a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: u32,
    pub number: u32,
}

/// Builds the `complexSearch` URL.
///
/// Values are appended literally; escaping is left to the transport.
pub(crate) fn search_url(
    base_url: &str,
    api_key: &str,
    query: &SearchQuery,
    page: Option<Page>,
) -> String {
    let mut url = format!("{base_url}/complexSearch?apiKey={api_key}&addRecipeInformation=true");
    if let Some(term) = query.ingredient_term() {
        url.push_str("&query=");
        url.push_str(&term);
    }
    for (key, value) in &query.filters {
        url.push('&');
        url.push_str(key);
        url.push('=');
        url.push_str(value);
    }
    if let Some(page) = page {
        url.push_str(&format!("&offset={}&number={}", page.offset, page.number));
    }
    url
}

/// Builds the recipe information URL for one recipe id.
pub(crate) fn detail_url(base_url: &str, api_key: &str, id: i64) -> String {
    format!("{base_url}/{id}/information?apiKey={api_key}&includeNutrition=true")
}
