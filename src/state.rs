//! Transient per-page UI state.
//!
//! Each component owns its state: a [`Toggle`] per detail card, a
//! [`TabState`] per tab bar. [`ViewState`] bundles what one page needs and
//! round-trips through the query string (`q`, `tag`, `tab`, `open`), so a
//! server-rendered page can reflect it and links can change it.
//!
//! State belongs to a route: [`ViewState::sync_route`] drops everything
//! when the route identity changes.

use crate::filter::{Query, Selector};
use std::{borrow::Cow, collections::BTreeMap};

// ============================================================================
// Toggle
// ============================================================================

/// Open/closed flag of a single expandable card. Starts closed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Toggle {
    open: bool,
}

impl Toggle {
    pub const fn new(open: bool) -> Self {
        Self { open }
    }

    pub const fn is_open(self) -> bool {
        self.open
    }

    pub const fn toggle(&mut self) {
        self.open = !self.open;
    }

    pub const fn open(&mut self) {
        self.open = true;
    }

    pub const fn close(&mut self) {
        self.open = false;
    }
}

// ============================================================================
// TabState
// ============================================================================

/// Active tab of one tab bar.
///
/// The first tab is active by default; selecting an unknown id is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabState {
    tabs: Vec<String>,
    active: usize,
}

impl TabState {
    pub fn new<I, S>(tabs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tabs: tabs.into_iter().map(Into::into).collect(),
            active: 0,
        }
    }

    /// Make `id` the active tab. Returns false if no tab has that id.
    pub fn select(&mut self, id: &str) -> bool {
        match self.tabs.iter().position(|t| t == id) {
            Some(index) => {
                self.active = index;
                true
            }
            None => false,
        }
    }

    /// Id of the active tab, `None` for an empty bar.
    pub fn active(&self) -> Option<&str> {
        self.tabs.get(self.active).map(String::as_str)
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.active() == Some(id)
    }

    pub fn reset(&mut self) {
        self.active = 0;
    }

    pub fn tabs(&self) -> impl Iterator<Item = &str> {
        self.tabs.iter().map(String::as_str)
    }
}

// ============================================================================
// ViewState
// ============================================================================

/// Everything transient on one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    /// Route identity the state belongs to (canonical path)
    route: String,
    text: String,
    selector: Selector,
    /// Requested tab id; validated against the bar when rendering
    tab: Option<String>,
    /// Open cards only; a closed card has no entry
    cards: BTreeMap<String, Toggle>,
}

impl ViewState {
    /// Default state for `route`.
    pub fn new(route: &str) -> Self {
        Self {
            route: route.to_owned(),
            ..Self::default()
        }
    }

    /// Decode state from a raw query string (without the leading `?`).
    ///
    /// Unknown keys are ignored; `open` may repeat.
    pub fn from_query_string(route: &str, query: &str) -> Self {
        let mut state = Self::new(route);
        for (key, value) in parse_query_string(query) {
            match &*key {
                "q" => state.set_text(&value),
                "tag" => state.set_selector(Selector::parse(&value)),
                "tab" if !value.is_empty() => state.tab = Some(value.into_owned()),
                "open" if !value.is_empty() => state.card_mut(&value).open(),
                _ => {}
            }
        }
        state
    }

    /// Bind the state to `route`, resetting it if the route changed.
    ///
    /// Returns true when a reset happened.
    pub fn sync_route(&mut self, route: &str) -> bool {
        if self.route == route {
            return false;
        }
        *self = Self::new(route);
        true
    }

    pub fn route(&self) -> &str {
        &self.route
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: &str) {
        text.trim().clone_into(&mut self.text);
    }

    pub const fn selector(&self) -> &Selector {
        &self.selector
    }

    pub fn set_selector(&mut self, selector: Selector) {
        self.selector = selector;
    }

    /// Filter built from the current text and selector.
    pub fn query(&self) -> Query {
        Query::new(&self.text, self.selector.clone())
    }

    pub fn tab(&self) -> Option<&str> {
        self.tab.as_deref()
    }

    pub fn select_tab(&mut self, id: &str) {
        self.tab = Some(id.to_owned());
    }

    /// Tab bar over `ids` with the requested tab applied when it exists.
    pub fn tab_state<I, S>(&self, ids: I) -> TabState
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tabs = TabState::new(ids);
        if let Some(tab) = &self.tab {
            tabs.select(tab);
        }
        tabs
    }

    /// State of the card `id`.
    pub fn card(&self, id: &str) -> Toggle {
        self.cards.get(id).copied().unwrap_or_default()
    }

    pub fn toggle_card(&mut self, id: &str) {
        self.card_mut(id).toggle();
        self.cards.retain(|_, toggle| toggle.is_open());
    }

    fn card_mut(&mut self, id: &str) -> &mut Toggle {
        self.cards.entry(id.to_owned()).or_default()
    }

    /// Encode as a query string, `""` for the default state.
    ///
    /// Keys are emitted in a fixed order so equal states encode equally.
    pub fn to_query_string(&self) -> String {
        let mut pairs: Vec<(&str, &str)> = Vec::new();
        if !self.text.is_empty() {
            pairs.push(("q", &self.text));
        }
        if let Some(tag) = self.selector.as_tag() {
            pairs.push(("tag", tag));
        }
        if let Some(tab) = &self.tab {
            pairs.push(("tab", tab));
        }
        for id in self.cards.keys() {
            pairs.push(("open", id));
        }

        pairs
            .iter()
            .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Link suffix (`?…` or empty) for this state after applying `change`.
    pub fn href_with(&self, change: impl FnOnce(&mut Self)) -> String {
        let mut next = self.clone();
        change(&mut next);
        let query = next.to_query_string();
        if query.is_empty() {
            query
        } else {
            format!("?{query}")
        }
    }
}

/// Split `a=1&b=2` into decoded pairs. `+` decodes to a space.
pub fn parse_query_string(query: &str) -> Vec<(Cow<'_, str>, Cow<'_, str>)> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(key), decode_component(value))
        })
        .collect()
}

fn decode_component(raw: &str) -> Cow<'_, str> {
    let raw: Cow<'_, str> = if raw.contains('+') {
        Cow::Owned(raw.replace('+', " "))
    } else {
        Cow::Borrowed(raw)
    };
    match urlencoding::decode(&raw) {
        Ok(decoded) => Cow::Owned(decoded.into_owned()),
        Err(_) => raw,
    }
}
