//! Scripted in-memory driver for tests.
//!
//! Simulates just enough of a browser for the hunter: pages with URL
//! history and page sources, a set of present elements, click effects,
//! native dialogs and popups. Every successful action is journaled so
//! tests can assert what was (and was not) attempted.

// ============================================================================
// Imports
// ============================================================================

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::control::StopSignal;
use crate::error::{Error, Result};
use crate::identifiers::PageId;

use super::contract::{Condition, Driver, SelectBy};
use super::selector::By;

// ============================================================================
// Types
// ============================================================================

/// One journaled driver action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Action {
    Navigate(String),
    Back,
    Fill(By, String),
    Click(By),
    Select(By, SelectBy),
    AcceptDialog,
    SwitchTo(PageId),
    ClosePage(PageId),
    Quit,
}

/// Side effect applied when a scripted trigger fires.
#[derive(Debug, Clone)]
pub(crate) enum Effect {
    /// Active page loads a URL.
    GoTo(String),
    /// Element disappears.
    Hide(By),
    /// Active page source becomes the given HTML.
    Source(String),
    /// A new page opens in the background.
    OpenPage(PageId, String),
    /// A page closes itself.
    ClosePage(PageId),
    /// Sets the source sequence of a page; each read consumes one entry
    /// until the last, which then repeats.
    PageSources(PageId, Vec<String>),
    /// A native dialog opens.
    Dialog,
    /// Trips a stop signal.
    Stop(StopSignal),
    /// Connection to the browser breaks.
    BreakTransport,
}

struct Page {
    id: PageId,
    url: String,
    history: Vec<String>,
    sources: VecDeque<String>,
}

impl Page {
    fn new(id: PageId, url: impl Into<String>) -> Self {
        Self {
            id,
            url: url.into(),
            history: Vec::new(),
            sources: VecDeque::from([String::new()]),
        }
    }

    fn peek_source(&self) -> String {
        self.sources.front().cloned().unwrap_or_default()
    }

    fn read_source(&mut self) -> String {
        if self.sources.len() > 1 {
            self.sources.pop_front().unwrap_or_default()
        } else {
            self.peek_source()
        }
    }
}

struct Trigger {
    nth: Option<usize>,
    effect: Effect,
}

struct Failure {
    nth: usize,
    error: fn() -> Error,
}

#[derive(Default)]
struct State {
    pages: Vec<Page>,
    active: usize,
    present: FxHashSet<By>,
    texts: FxHashMap<By, String>,
    options: FxHashMap<By, Vec<SelectBy>>,
    on_click: FxHashMap<By, Vec<Trigger>>,
    click_failures: FxHashMap<By, Vec<Failure>>,
    unswitchable: FxHashSet<PageId>,
    click_counts: FxHashMap<By, usize>,
    dialogs: usize,
    broken: bool,
    journal: Vec<Action>,
}

// ============================================================================
// ScriptedDriver
// ============================================================================

/// In-memory [`Driver`] driven by a script of triggers and effects.
pub(crate) struct ScriptedDriver {
    state: Mutex<State>,
}

impl ScriptedDriver {
    /// Main page id of every scripted session.
    pub(crate) const MAIN: &'static str = "main";

    /// Creates a driver with one page open at `url`.
    pub(crate) fn new(url: &str) -> Self {
        let state = State {
            pages: vec![Page::new(PageId::new(Self::MAIN), url)],
            ..State::default()
        };
        Self {
            state: Mutex::new(state),
        }
    }

    /// Makes an element present.
    pub(crate) fn show(&self, by: By) {
        self.state.lock().present.insert(by);
    }

    /// Makes several elements present.
    pub(crate) fn show_all(&self, bys: impl IntoIterator<Item = By>) {
        self.state.lock().present.extend(bys);
    }

    /// Sets the text returned by `read_text`.
    pub(crate) fn set_text(&self, by: By, text: &str) {
        self.state.lock().texts.insert(by, text.to_string());
    }

    /// Sets the options a `<select>` offers.
    pub(crate) fn set_options(&self, by: By, options: Vec<SelectBy>) {
        self.state.lock().options.insert(by, options);
    }

    /// Applies an effect every time `by` is clicked.
    pub(crate) fn on_click(&self, by: By, effect: Effect) {
        self.state
            .lock()
            .on_click
            .entry(by)
            .or_default()
            .push(Trigger { nth: None, effect });
    }

    /// Applies an effect only on the `nth` click (1-based) of `by`.
    pub(crate) fn on_nth_click(&self, by: By, nth: usize, effect: Effect) {
        self.state
            .lock()
            .on_click
            .entry(by)
            .or_default()
            .push(Trigger {
                nth: Some(nth),
                effect,
            });
    }

    /// Makes the `nth` click (1-based) of `by` fail with `error`.
    ///
    /// The failed click still counts towards later `nth` triggers.
    pub(crate) fn fail_click(&self, by: By, nth: usize, error: fn() -> Error) {
        self.state
            .lock()
            .click_failures
            .entry(by)
            .or_default()
            .push(Failure { nth, error });
    }

    /// Makes every switch to `page` fail as if the page were gone.
    pub(crate) fn fail_switch(&self, page: PageId) {
        self.state.lock().unswitchable.insert(page);
    }

    /// Returns all journaled actions.
    pub(crate) fn journal(&self) -> Vec<Action> {
        self.state.lock().journal.clone()
    }

    /// Returns how often `by` was clicked.
    pub(crate) fn clicks(&self, by: &By) -> usize {
        self.state.lock().click_counts.get(by).copied().unwrap_or(0)
    }

    /// Returns every URL navigated to.
    pub(crate) fn navigations(&self) -> Vec<String> {
        self.journal()
            .into_iter()
            .filter_map(|a| match a {
                Action::Navigate(url) => Some(url),
                _ => None,
            })
            .collect()
    }

    /// Returns the ids of open pages.
    pub(crate) fn open_pages(&self) -> Vec<PageId> {
        self.state.lock().pages.iter().map(|p| p.id.clone()).collect()
    }

    /// Returns the journaled fill for `by`, if any.
    pub(crate) fn filled(&self, by: &By) -> Option<String> {
        self.journal().into_iter().rev().find_map(|a| match a {
            Action::Fill(b, text) if &b == by => Some(text),
            _ => None,
        })
    }
}

// ============================================================================
// State helpers
// ============================================================================

impl State {
    fn ensure_connected(&self) -> Result<()> {
        if self.broken {
            return Err(Error::transport("connection refused"));
        }
        if self.pages.is_empty() {
            return Err(Error::SessionClosed);
        }
        Ok(())
    }

    fn active_page(&mut self) -> &mut Page {
        let active = self.active;
        &mut self.pages[active]
    }

    fn ensure_present(&self, by: &By) -> Result<()> {
        if self.present.contains(by) {
            Ok(())
        } else {
            Err(Error::element_not_found(by.to_string()))
        }
    }

    fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::GoTo(url) => {
                let page = self.active_page();
                let previous = std::mem::replace(&mut page.url, url);
                page.history.push(previous);
            }
            Effect::Hide(by) => {
                self.present.remove(&by);
            }
            Effect::Source(html) => {
                self.active_page().sources = VecDeque::from([html]);
            }
            Effect::OpenPage(id, url) => {
                self.pages.push(Page::new(id, url));
            }
            Effect::ClosePage(id) => {
                if let Some(index) = self.pages.iter().position(|p| p.id == id) {
                    self.pages.remove(index);
                    if self.active >= index && self.active > 0 {
                        self.active -= 1;
                    }
                }
            }
            Effect::PageSources(id, sources) => {
                if let Some(page) = self.pages.iter_mut().find(|p| p.id == id) {
                    page.sources = sources.into();
                }
            }
            Effect::Dialog => self.dialogs += 1,
            Effect::Stop(signal) => signal.stop(),
            Effect::BreakTransport => self.broken = true,
        }
    }
}

// ============================================================================
// Driver Implementation
// ============================================================================

#[async_trait]
impl Driver for ScriptedDriver {
    async fn navigate(&self, url: &str) -> Result<()> {
        let mut state = self.state.lock();
        state.ensure_connected()?;
        state.journal.push(Action::Navigate(url.to_string()));
        state.apply(Effect::GoTo(url.to_string()));
        Ok(())
    }

    async fn back(&self) -> Result<()> {
        let mut state = self.state.lock();
        state.ensure_connected()?;
        state.journal.push(Action::Back);
        let page = state.active_page();
        if let Some(previous) = page.history.pop() {
            page.url = previous;
        }
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        let mut state = self.state.lock();
        state.ensure_connected()?;
        Ok(state.active_page().url.clone())
    }

    async fn page_source(&self) -> Result<String> {
        let mut state = self.state.lock();
        state.ensure_connected()?;
        Ok(state.active_page().read_source())
    }

    async fn fill(&self, by: &By, text: &str) -> Result<()> {
        let mut state = self.state.lock();
        state.ensure_connected()?;
        state.ensure_present(by)?;
        state.journal.push(Action::Fill(by.clone(), text.to_string()));
        Ok(())
    }

    async fn click(&self, by: &By) -> Result<()> {
        let mut state = self.state.lock();
        state.ensure_connected()?;
        state.ensure_present(by)?;

        let count = {
            let count = state.click_counts.entry(by.clone()).or_default();
            *count += 1;
            *count
        };
        if let Some(failure) = state
            .click_failures
            .get(by)
            .and_then(|failures| failures.iter().find(|f| f.nth == count))
        {
            return Err((failure.error)());
        }
        state.journal.push(Action::Click(by.clone()));

        let effects: Vec<Effect> = state
            .on_click
            .get(by)
            .map(|triggers| {
                triggers
                    .iter()
                    .filter(|t| t.nth.is_none_or(|n| n == count))
                    .map(|t| t.effect.clone())
                    .collect()
            })
            .unwrap_or_default();

        for effect in effects {
            state.apply(effect);
        }
        Ok(())
    }

    async fn read_text(&self, by: &By) -> Result<String> {
        let state = self.state.lock();
        state.ensure_connected()?;
        state
            .texts
            .get(by)
            .cloned()
            .ok_or_else(|| Error::element_not_found(by.to_string()))
    }

    async fn select_option(&self, by: &By, option: &SelectBy) -> Result<()> {
        let mut state = self.state.lock();
        state.ensure_connected()?;
        state.ensure_present(by)?;
        let offered = state
            .options
            .get(by)
            .is_some_and(|opts| opts.contains(option));
        if !offered {
            return Err(Error::option_not_found(by.to_string(), option.as_str()));
        }
        state.journal.push(Action::Select(by.clone(), option.clone()));
        Ok(())
    }

    async fn accept_next_dialog(&self) -> Result<bool> {
        let mut state = self.state.lock();
        state.ensure_connected()?;
        if state.dialogs == 0 {
            return Ok(false);
        }
        state.dialogs -= 1;
        state.journal.push(Action::AcceptDialog);
        Ok(true)
    }

    async fn list_open_pages(&self) -> Result<Vec<PageId>> {
        let state = self.state.lock();
        state.ensure_connected()?;
        Ok(state.pages.iter().map(|p| p.id.clone()).collect())
    }

    async fn current_page(&self) -> Result<PageId> {
        let mut state = self.state.lock();
        state.ensure_connected()?;
        Ok(state.active_page().id.clone())
    }

    async fn switch_to(&self, page: &PageId) -> Result<()> {
        let mut state = self.state.lock();
        state.ensure_connected()?;
        if state.unswitchable.contains(page) {
            return Err(Error::page_not_found(page.clone()));
        }
        let index = state
            .pages
            .iter()
            .position(|p| &p.id == page)
            .ok_or_else(|| Error::page_not_found(page.clone()))?;
        state.active = index;
        state.journal.push(Action::SwitchTo(page.clone()));
        Ok(())
    }

    async fn close_page(&self) -> Result<()> {
        let mut state = self.state.lock();
        state.ensure_connected()?;
        let active = state.active;
        let closed = state.pages.remove(active);
        state.active = 0;
        state.journal.push(Action::ClosePage(closed.id));
        Ok(())
    }

    async fn quit(&self) -> Result<()> {
        let mut state = self.state.lock();
        state.journal.push(Action::Quit);
        state.pages.clear();
        Ok(())
    }

    async fn check(&self, condition: &Condition) -> Result<bool> {
        let mut state = self.state.lock();
        state.ensure_connected()?;
        let holds = match condition {
            Condition::Present(by) | Condition::Visible(by) => state.present.contains(by),
            Condition::UrlContains(fragment) => state.active_page().url.contains(fragment.as_str()),
        };
        Ok(holds)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_click_applies_effects() {
        let driver = ScriptedDriver::new("https://example.test/a");
        let button = By::id("go");
        driver.show(button.clone());
        driver.on_click(button.clone(), Effect::GoTo("https://example.test/b".into()));

        driver.click(&button).await.unwrap();

        assert_eq!(driver.current_url().await.unwrap(), "https://example.test/b");
        driver.back().await.unwrap();
        assert_eq!(driver.current_url().await.unwrap(), "https://example.test/a");
    }

    #[tokio::test]
    async fn test_nth_click_only_fires_once() {
        let driver = ScriptedDriver::new("https://example.test/");
        let button = By::id("go");
        driver.show(button.clone());
        driver.on_nth_click(button.clone(), 2, Effect::Dialog);

        driver.click(&button).await.unwrap();
        assert!(!driver.accept_next_dialog().await.unwrap());
        driver.click(&button).await.unwrap();
        assert!(driver.accept_next_dialog().await.unwrap());
        driver.click(&button).await.unwrap();
        assert!(!driver.accept_next_dialog().await.unwrap());
        assert_eq!(driver.clicks(&button), 3);
    }

    #[tokio::test]
    async fn test_source_sequence_repeats_last() {
        let driver = ScriptedDriver::new("https://example.test/");
        let main = PageId::new(ScriptedDriver::MAIN);
        let button = By::id("go");
        driver.show(button.clone());
        driver.on_click(
            button.clone(),
            Effect::PageSources(main, vec!["one".into(), "two".into()]),
        );
        driver.click(&button).await.unwrap();

        assert_eq!(driver.page_source().await.unwrap(), "one");
        assert_eq!(driver.page_source().await.unwrap(), "two");
        assert_eq!(driver.page_source().await.unwrap(), "two");
    }

    #[tokio::test]
    async fn test_page_closing_itself() {
        let driver = ScriptedDriver::new("https://example.test/");
        let popup = PageId::new("popup");
        let button = By::id("pay");
        driver.show(button.clone());
        driver.on_nth_click(button.clone(), 1, Effect::OpenPage(popup.clone(), "about:blank".into()));
        driver.on_nth_click(button.clone(), 2, Effect::ClosePage(popup.clone()));
        driver.click(&button).await.unwrap();
        driver.switch_to(&popup).await.unwrap();
        driver.click(&button).await.unwrap();

        assert_eq!(driver.open_pages(), vec![PageId::new(ScriptedDriver::MAIN)]);
        assert_eq!(driver.current_page().await.unwrap().as_str(), ScriptedDriver::MAIN);
    }

    #[tokio::test]
    async fn test_broken_transport() {
        let driver = ScriptedDriver::new("https://example.test/");
        let button = By::id("go");
        driver.show(button.clone());
        driver.on_click(button.clone(), Effect::BreakTransport);
        driver.click(&button).await.unwrap();

        let err = driver.current_url().await.unwrap_err();
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let driver = ScriptedDriver::new("https://example.test/");
        let button = By::id("go");
        let popup = PageId::new("popup");
        driver.show(button.clone());
        driver.fail_click(button.clone(), 1, || Error::element_not_found("#go"));
        driver.on_nth_click(button.clone(), 2, Effect::OpenPage(popup.clone(), "about:blank".into()));
        driver.fail_switch(popup.clone());

        assert!(driver.click(&button).await.is_err());
        driver.click(&button).await.unwrap();
        assert_eq!(driver.clicks(&button), 2);
        assert_eq!(driver.open_pages().len(), 2);

        let err = driver.switch_to(&popup).await.unwrap_err();
        assert!(matches!(err, Error::PageNotFound { .. }));
        assert_eq!(driver.journal(), vec![Action::Click(button)]);
    }

    #[tokio::test]
    async fn test_read_text() {
        let driver = ScriptedDriver::new("https://example.test/");
        let notice = By::css(".notice");
        driver.set_text(notice.clone(), "잔여석없음");

        assert_eq!(driver.read_text(&notice).await.unwrap(), "잔여석없음");
        let err = driver.read_text(&By::css(".absent")).await.unwrap_err();
        assert!(matches!(err, Error::ElementNotFound { .. }));
    }

    #[tokio::test]
    async fn test_missing_option() {
        let driver = ScriptedDriver::new("https://example.test/");
        let select = By::name("dptTm");
        driver.show(select.clone());
        driver.set_options(select.clone(), vec![SelectBy::Value("080000".into())]);

        assert!(driver.select_option(&select, &SelectBy::Value("080000".into())).await.is_ok());
        let err = driver
            .select_option(&select, &SelectBy::Value("090000".into()))
            .await
            .unwrap_err();
        assert!(err.is_fatal_config());
    }
}
