//=========================================================================
// Host Environment
//=========================================================================
//
// The document an embedded game is injected into: capability probes,
// script and stylesheet injection, entry-point lookup and the container
// the game draws into.
//
// `HeadlessEnvironment` is the in-memory implementation. Scripts resolve
// after a configurable number of polls, may require earlier scripts, and
// may define an entry symbol bound to a game constructor.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::{HashMap, HashSet};
use std::fmt;

use log::debug;

//=== Internal Dependencies ===============================================

use super::games::PacmanDemo;
use super::handle::EmbeddedGame;

//=== Capability ==========================================================

/// Runtime feature a game bundle needs from the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Canvas,
    Audio,
    LocalStorage,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Canvas => "canvas",
            Self::Audio => "audio",
            Self::LocalStorage => "local storage",
        };
        f.write_str(name)
    }
}

//=== Assets ==============================================================

/// Script to inject, in manifest order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptRef {
    pub src: String,
    pub module: bool,
}

impl ScriptRef {
    pub fn classic(src: &str) -> Self {
        Self {
            src: src.to_string(),
            module: false,
        }
    }

    pub fn module(src: &str) -> Self {
        Self {
            src: src.to_string(),
            module: true,
        }
    }
}

/// Stylesheet scoped to the game container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleSheet {
    pub scope: String,
    pub css: String,
}

/// Constructor bound to an entry symbol once its script has loaded.
pub type GameFactory = fn() -> Box<dyn EmbeddedGame>;

/// Asset loading failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    /// Script could not be fetched or evaluated.
    Script { src: String, reason: String },

    /// Script ran before a script it depends on.
    MissingDependency { src: String, requires: String },

    /// Stylesheet could not be injected.
    Style { scope: String, reason: String },
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Script { src, reason } => write!(f, "Script {} failed: {}", src, reason),
            Self::MissingDependency { src, requires } => {
                write!(f, "Script {} requires {} to load first", src, requires)
            }
            Self::Style { scope, reason } => write!(f, "Stylesheet {} failed: {}", scope, reason),
        }
    }
}

impl std::error::Error for AssetError {}

/// Progress of a script started with [`HostEnvironment::begin_script`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptStatus {
    Pending,
    Loaded,
    Failed(AssetError),
}

//=== HostEnvironment =====================================================

/// Document-side operations the game host relies on.
///
/// Removal methods return false when the resource is already gone; the
/// host treats that as success.
pub trait HostEnvironment: Send {
    fn supports(&self, capability: Capability) -> bool;

    fn begin_script(&mut self, script: &ScriptRef);

    fn poll_script(&mut self, src: &str) -> ScriptStatus;

    fn remove_script(&mut self, src: &str) -> bool;

    fn inject_stylesheet(&mut self, sheet: &StyleSheet) -> Result<(), AssetError>;

    fn remove_stylesheet(&mut self, scope: &str) -> bool;

    /// Looks up a symbol defined by a loaded script.
    fn resolve_entry(&self, symbol: &str) -> Option<GameFactory>;

    fn render(&mut self, container: &str, content: &str);

    fn clear_container(&mut self, container: &str) -> bool;
}

impl<T: HostEnvironment + ?Sized> HostEnvironment for Box<T> {
    fn supports(&self, capability: Capability) -> bool {
        (**self).supports(capability)
    }

    fn begin_script(&mut self, script: &ScriptRef) {
        (**self).begin_script(script)
    }

    fn poll_script(&mut self, src: &str) -> ScriptStatus {
        (**self).poll_script(src)
    }

    fn remove_script(&mut self, src: &str) -> bool {
        (**self).remove_script(src)
    }

    fn inject_stylesheet(&mut self, sheet: &StyleSheet) -> Result<(), AssetError> {
        (**self).inject_stylesheet(sheet)
    }

    fn remove_stylesheet(&mut self, scope: &str) -> bool {
        (**self).remove_stylesheet(scope)
    }

    fn resolve_entry(&self, symbol: &str) -> Option<GameFactory> {
        (**self).resolve_entry(symbol)
    }

    fn render(&mut self, container: &str, content: &str) {
        (**self).render(container, content)
    }

    fn clear_container(&mut self, container: &str) -> bool {
        (**self).clear_container(container)
    }
}

//=== HeadlessEnvironment =================================================

/// Script known to the headless document.
#[derive(Debug, Clone)]
pub struct BundleScript {
    pub requires: Vec<String>,
    pub defines: Option<(String, GameFactory)>,
    pub latency_polls: u32,
}

impl BundleScript {
    pub fn plain() -> Self {
        Self {
            requires: Vec::new(),
            defines: None,
            latency_polls: 0,
        }
    }

    pub fn requiring(mut self, src: &str) -> Self {
        self.requires.push(src.to_string());
        self
    }

    pub fn defining(mut self, symbol: &str, factory: GameFactory) -> Self {
        self.defines = Some((symbol.to_string(), factory));
        self
    }
}

/// Document mutation recorded by [`HeadlessEnvironment`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Removal {
    Container(String),
    Stylesheet(String),
    Script(String),
}

/// In-memory document used by tests and the demo binary.
#[derive(Debug, Default)]
pub struct HeadlessEnvironment {
    capabilities: HashSet<Capability>,
    known: HashMap<String, BundleScript>,
    failing: HashSet<String>,
    in_flight: HashMap<String, u32>,
    loaded: Vec<String>,
    load_log: Vec<String>,
    globals: HashMap<String, (String, GameFactory)>,
    stylesheets: Vec<String>,
    containers: HashMap<String, String>,
    removals: Vec<Removal>,
}

impl HeadlessEnvironment {
    //--- Construction -----------------------------------------------------

    /// Empty document supporting every capability.
    pub fn new() -> Self {
        Self {
            capabilities: [Capability::Canvas, Capability::Audio, Capability::LocalStorage]
                .into_iter()
                .collect(),
            ..Self::default()
        }
    }

    /// Document serving the arcade bundles shipped with the café.
    ///
    /// The falling-blocks bundle loads but never defines its entry symbol.
    pub fn with_stock_bundles() -> Self {
        Self::new()
            .with_script("/pacman/modernizr-1.5.min.js", BundleScript::plain())
            .with_script(
                "/pacman/pacman.js",
                BundleScript::plain()
                    .requiring("/pacman/modernizr-1.5.min.js")
                    .defining("PACMAN", pacman_entry),
            )
            .with_script("/tetris/js/blockset.js", BundleScript::plain())
            .with_script(
                "/tetris/js/game.js",
                BundleScript::plain().requiring("/tetris/js/blockset.js"),
            )
            .with_script("/tetris/js/audio.js", BundleScript::plain())
    }

    pub fn with_script(mut self, src: &str, script: BundleScript) -> Self {
        self.known.insert(src.to_string(), script);
        self
    }

    pub fn without_capability(mut self, capability: Capability) -> Self {
        self.capabilities.remove(&capability);
        self
    }

    /// Makes the named script or stylesheet scope fail to load.
    pub fn failing(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    /// Delays a script by `polls` extra polls.
    pub fn with_latency(mut self, src: &str, polls: u32) -> Self {
        if let Some(script) = self.known.get_mut(src) {
            script.latency_polls = polls;
        }
        self
    }

    //--- Inspection -------------------------------------------------------

    /// Scripts in the order they were started.
    pub fn load_log(&self) -> &[String] {
        &self.load_log
    }

    /// Scripts currently present in the document.
    pub fn loaded_scripts(&self) -> &[String] {
        &self.loaded
    }

    pub fn stylesheets(&self) -> &[String] {
        &self.stylesheets
    }

    pub fn removals(&self) -> &[Removal] {
        &self.removals
    }

    pub fn container_content(&self, container: &str) -> Option<&str> {
        self.containers.get(container).map(String::as_str)
    }

    /// Removes a script behind the host's back.
    pub fn remove_script_externally(&mut self, src: &str) -> bool {
        let Some(pos) = self.loaded.iter().position(|s| s == src) else {
            return false;
        };
        self.loaded.remove(pos);
        self.globals.retain(|_, (owner, _)| owner != src);
        true
    }

    pub fn remove_stylesheet_externally(&mut self, scope: &str) -> bool {
        let before = self.stylesheets.len();
        self.stylesheets.retain(|s| s != scope);
        before != self.stylesheets.len()
    }
}

fn pacman_entry() -> Box<dyn EmbeddedGame> {
    Box::new(PacmanDemo::new())
}

impl HostEnvironment for HeadlessEnvironment {
    fn supports(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    fn begin_script(&mut self, script: &ScriptRef) {
        let latency = self
            .known
            .get(&script.src)
            .map(|known| known.latency_polls)
            .unwrap_or(0);
        self.load_log.push(script.src.clone());
        self.in_flight.insert(script.src.clone(), latency);
    }

    fn poll_script(&mut self, src: &str) -> ScriptStatus {
        let Some(remaining) = self.in_flight.get_mut(src) else {
            return ScriptStatus::Failed(AssetError::Script {
                src: src.to_string(),
                reason: "not requested".to_string(),
            });
        };
        if *remaining > 0 {
            *remaining -= 1;
            return ScriptStatus::Pending;
        }
        self.in_flight.remove(src);

        let known = match self.known.get(src) {
            Some(known) if !self.failing.contains(src) => known,
            _ => {
                return ScriptStatus::Failed(AssetError::Script {
                    src: src.to_string(),
                    reason: "404 not found".to_string(),
                })
            }
        };

        if let Some(missing) = known.requires.iter().find(|dep| !self.loaded.contains(*dep)) {
            return ScriptStatus::Failed(AssetError::MissingDependency {
                src: src.to_string(),
                requires: missing.clone(),
            });
        }

        if let Some((symbol, factory)) = &known.defines {
            self.globals.insert(symbol.clone(), (src.to_string(), *factory));
        }
        self.loaded.push(src.to_string());
        debug!(target: "host_env", "Script {} loaded", src);
        ScriptStatus::Loaded
    }

    fn remove_script(&mut self, src: &str) -> bool {
        self.in_flight.remove(src);
        let removed = self.remove_script_externally(src);
        if removed {
            self.removals.push(Removal::Script(src.to_string()));
        }
        removed
    }

    fn inject_stylesheet(&mut self, sheet: &StyleSheet) -> Result<(), AssetError> {
        if self.failing.contains(&sheet.scope) {
            return Err(AssetError::Style {
                scope: sheet.scope.clone(),
                reason: "rejected".to_string(),
            });
        }
        self.stylesheets.push(sheet.scope.clone());
        Ok(())
    }

    fn remove_stylesheet(&mut self, scope: &str) -> bool {
        let removed = self.remove_stylesheet_externally(scope);
        if removed {
            self.removals.push(Removal::Stylesheet(scope.to_string()));
        }
        removed
    }

    fn resolve_entry(&self, symbol: &str) -> Option<GameFactory> {
        self.globals.get(symbol).map(|(_, factory)| *factory)
    }

    fn render(&mut self, container: &str, content: &str) {
        self.containers.insert(container.to_string(), content.to_string());
    }

    fn clear_container(&mut self, container: &str) -> bool {
        let cleared = self.containers.remove(container).is_some();
        if cleared {
            self.removals.push(Removal::Container(container.to_string()));
        }
        cleared
    }
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn load(env: &mut HeadlessEnvironment, src: &str) -> ScriptStatus {
        env.begin_script(&ScriptRef::classic(src));
        loop {
            match env.poll_script(src) {
                ScriptStatus::Pending => continue,
                status => return status,
            }
        }
    }

    #[test]
    fn dependent_script_fails_when_loaded_first() {
        let mut env = HeadlessEnvironment::with_stock_bundles();
        let status = load(&mut env, "/pacman/pacman.js");

        assert!(matches!(status, ScriptStatus::Failed(AssetError::MissingDependency { .. })));
        assert!(env.resolve_entry("PACMAN").is_none());
    }

    #[test]
    fn ordered_load_defines_entry() {
        let mut env = HeadlessEnvironment::with_stock_bundles();
        assert_eq!(load(&mut env, "/pacman/modernizr-1.5.min.js"), ScriptStatus::Loaded);
        assert_eq!(load(&mut env, "/pacman/pacman.js"), ScriptStatus::Loaded);

        assert!(env.resolve_entry("PACMAN").is_some());
        assert_eq!(env.loaded_scripts().len(), 2);
    }

    #[test]
    fn removing_script_drops_its_symbols() {
        let mut env = HeadlessEnvironment::with_stock_bundles();
        load(&mut env, "/pacman/modernizr-1.5.min.js");
        load(&mut env, "/pacman/pacman.js");

        assert!(env.remove_script("/pacman/pacman.js"));
        assert!(!env.remove_script("/pacman/pacman.js"));
        assert!(env.resolve_entry("PACMAN").is_none());
        assert_eq!(env.removals(), &[Removal::Script("/pacman/pacman.js".into())]);
    }

    #[test]
    fn latency_keeps_script_pending() {
        let mut env = HeadlessEnvironment::with_stock_bundles().with_latency("/tetris/js/audio.js", 2);
        env.begin_script(&ScriptRef::module("/tetris/js/audio.js"));

        assert_eq!(env.poll_script("/tetris/js/audio.js"), ScriptStatus::Pending);
        assert_eq!(env.poll_script("/tetris/js/audio.js"), ScriptStatus::Pending);
        assert_eq!(env.poll_script("/tetris/js/audio.js"), ScriptStatus::Loaded);
    }

    #[test]
    fn unknown_or_failing_scripts_fail() {
        let mut env = HeadlessEnvironment::with_stock_bundles().failing("/tetris/js/blockset.js");
        assert!(matches!(load(&mut env, "/missing.js"), ScriptStatus::Failed(_)));
        assert!(matches!(load(&mut env, "/tetris/js/blockset.js"), ScriptStatus::Failed(_)));
    }

    #[test]
    fn container_render_and_clear() {
        let mut env = HeadlessEnvironment::new();
        env.render("game", "READY");
        assert_eq!(env.container_content("game"), Some("READY"));

        assert!(env.clear_container("game"));
        assert!(!env.clear_container("game"));
        assert_eq!(env.container_content("game"), None);
    }

    #[test]
    fn capabilities_can_be_withdrawn() {
        let env = HeadlessEnvironment::new().without_capability(Capability::Audio);
        assert!(!env.supports(Capability::Audio));
        assert!(env.supports(Capability::Canvas));
    }
}
