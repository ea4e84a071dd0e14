use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::config::Config;
use crate::dictionary::cache::{DictionaryCache, DiskCache};
use crate::dictionary::loader::BankLoader;
use crate::dictionary::source::DictionarySource;
use crate::practice::kind::{DrillKind, RootDrill, SplitDrill};
use crate::session::controller::{DrillController, DrillStatus};
use crate::store::kv::FileStore;
use crate::ui::components::menu::Menu;
use crate::ui::theme::Theme;

/// Ticks the prompt keeps shaking after a miss.
const SHAKE_TICKS: u8 = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Menu,
    Drill,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrillMode {
    Root,
    Split,
}

impl DrillMode {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "root" => Some(DrillMode::Root),
            "split" => Some(DrillMode::Split),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DrillMode::Root => "root",
            DrillMode::Split => "split",
        }
    }

    pub fn index(self) -> usize {
        match self {
            DrillMode::Root => 0,
            DrillMode::Split => 1,
        }
    }
}

/// A drill controller plus the bank load feeding it.
pub struct DrillPane<K: DrillKind> {
    pub controller: DrillController<K, FileStore>,
    loader: Option<BankLoader<K::Question>>,
}

impl<K: DrillKind> DrillPane<K> {
    fn new(store: FileStore) -> Self {
        let mut controller = DrillController::new(store);
        controller.begin_load();
        Self {
            controller,
            loader: None,
        }
    }

    /// Spawn a load when the controller waits on a token nothing serves.
    fn ensure_loading(&mut self, source: &DictionarySource, cache: &Arc<DictionaryCache>) {
        if self.controller.status() != DrillStatus::Loading {
            return;
        }
        let token = self.controller.load_token();
        if self.loader.as_ref().is_some_and(|l| l.token() == token) {
            return;
        }
        // Replacing the handle cancels the superseded load.
        self.loader = Some(BankLoader::spawn::<K>(token, source.clone(), Arc::clone(cache)));
    }

    fn poll(&mut self) {
        let Some(load) = self.loader.as_ref().and_then(|l| l.try_take()) else {
            return;
        };
        self.loader = None;
        self.controller.apply_load(load);
    }

    fn reload(&mut self) {
        self.loader = None;
        self.controller.begin_load();
    }

    fn cancel(&mut self) {
        if let Some(loader) = self.loader.take() {
            loader.cancel();
        }
    }

    /// Append one typed character to the answer field. True when it
    /// completed a wrong answer.
    fn type_char(&mut self, ch: char) -> bool {
        let misses = self.controller.shake_tick();
        let raw = format!("{}{}", self.controller.input(), ch);
        self.controller.submit_input(&raw);
        self.controller.shake_tick() != misses
    }

    fn backspace(&mut self) {
        let mut raw = self.controller.input().to_string();
        raw.pop();
        self.controller.submit_input(&raw);
    }

    /// Reset the round, or retry the load when it failed.
    fn reset_or_reload(&mut self) {
        match self.controller.status() {
            DrillStatus::Unavailable(_) => self.reload(),
            _ => self.controller.reset_round(),
        }
    }

    fn toggle_scheme(&mut self) {
        let next = self.controller.active_scheme().toggle();
        self.controller.switch_scheme(next);
    }
}

pub struct App {
    pub screen: AppScreen,
    pub drill_mode: DrillMode,
    pub menu: Menu<'static>,
    pub theme: &'static Theme,
    pub config: Config,
    pub root: DrillPane<RootDrill>,
    pub split: DrillPane<SplitDrill>,
    pub show_root_chart: bool,
    pub show_hint: bool,
    pub shake_ticks: u8,
    pub should_quit: bool,
    source: DictionarySource,
    cache: Arc<DictionaryCache>,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let loaded_theme = Theme::load(&config.theme).unwrap_or_default();
        let theme: &'static Theme = Box::leak(Box::new(loaded_theme));
        let mut menu = Menu::new(theme);

        let store = FileStore::with_base_dir(PathBuf::from(&config.storage_dir))?;
        let source = DictionarySource::local(PathBuf::from(&config.dictionary_dir))
            .with_base_url(&config.dictionary_base_url, DiskCache::new("downloads"));
        info!(
            storage = %config.storage_dir,
            dictionaries = %config.dictionary_dir,
            "starting"
        );

        let drill_mode = DrillMode::from_name(&config.default_drill).unwrap_or(DrillMode::Root);
        menu.selected = drill_mode.index();

        Ok(Self {
            screen: AppScreen::Menu,
            drill_mode,
            menu,
            theme,
            show_root_chart: config.show_root_chart,
            show_hint: false,
            shake_ticks: 0,
            should_quit: false,
            root: DrillPane::new(store.clone()),
            split: DrillPane::new(store),
            config,
            source,
            cache: Arc::new(DictionaryCache::new()),
        })
    }

    pub fn start_drill(&mut self, mode: DrillMode) {
        self.drill_mode = mode;
        self.shake_ticks = 0;
        self.screen = AppScreen::Drill;
        self.ensure_loading();
    }

    pub fn go_to_menu(&mut self) {
        self.screen = AppScreen::Menu;
        self.menu.selected = self.drill_mode.index();
    }

    fn ensure_loading(&mut self) {
        match self.drill_mode {
            DrillMode::Root => self.root.ensure_loading(&self.source, &self.cache),
            DrillMode::Split => self.split.ensure_loading(&self.source, &self.cache),
        }
    }

    pub fn on_tick(&mut self) {
        self.root.poll();
        self.split.poll();
        if self.screen == AppScreen::Drill {
            self.ensure_loading();
        }
        self.shake_ticks = self.shake_ticks.saturating_sub(1);
    }

    pub fn status(&self) -> DrillStatus {
        match self.drill_mode {
            DrillMode::Root => self.root.controller.status(),
            DrillMode::Split => self.split.controller.status(),
        }
    }

    pub fn type_char(&mut self, ch: char) {
        let missed = match self.drill_mode {
            DrillMode::Root => self.root.type_char(ch),
            DrillMode::Split => self.split.type_char(ch),
        };
        if missed {
            self.shake_ticks = SHAKE_TICKS;
        }
    }

    pub fn backspace(&mut self) {
        match self.drill_mode {
            DrillMode::Root => self.root.backspace(),
            DrillMode::Split => self.split.backspace(),
        }
    }

    pub fn reset_round(&mut self) {
        self.shake_ticks = 0;
        if matches!(self.status(), DrillStatus::Unavailable(_)) {
            // Files may have been put in place since; read everything again.
            self.cache.clear();
        }
        match self.drill_mode {
            DrillMode::Root => self.root.reset_or_reload(),
            DrillMode::Split => self.split.reset_or_reload(),
        }
        self.ensure_loading();
    }

    pub fn toggle_scheme(&mut self) {
        self.shake_ticks = 0;
        match self.drill_mode {
            DrillMode::Root => self.root.toggle_scheme(),
            DrillMode::Split => self.split.toggle_scheme(),
        }
        self.ensure_loading();
    }

    pub fn toggle_aid(&mut self) {
        match self.drill_mode {
            DrillMode::Root => self.show_root_chart = !self.show_root_chart,
            DrillMode::Split => self.show_hint = !self.show_hint,
        }
    }

    pub fn quit(&mut self) {
        self.root.cancel();
        self.split.cancel();
        self.should_quit = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::practice::root::build_root_banks;

    #[test]
    fn test_drill_mode_from_name() {
        assert_eq!(DrillMode::from_name("root"), Some(DrillMode::Root));
        assert_eq!(DrillMode::from_name(" Split "), Some(DrillMode::Split));
        assert_eq!(DrillMode::from_name("speed"), None);
        assert_eq!(DrillMode::Split.as_str(), "split");
    }

    #[test]
    fn test_pane_reports_misses_from_controller() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = FileStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        let mut pane: DrillPane<RootDrill> = DrillPane::new(store);
        let token = pane.controller.load_token();
        assert!(pane.controller.apply_banks(token, build_root_banks()));

        let key = pane.controller.current_question().unwrap().key.clone();
        let wrong = if key == "q" { 'w' } else { 'q' };
        assert!(pane.type_char(wrong));
        assert_eq!(pane.controller.shake_tick(), 1);

        let right = key.chars().next().unwrap();
        assert!(!pane.type_char(right));
    }
}
