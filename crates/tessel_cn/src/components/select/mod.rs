//! Select component for value selection
//!
//! A themed select that reconciles a simple configuration surface onto the
//! general-purpose dropdown widget. Options may be grouped and may use
//! alternate field names; values may be scalar, multiple, or (in async mode)
//! opaque records held by the caller.
//!
//! # Example
//!
//! ```ignore
//! use tessel_cn::prelude::*;
//!
//! let config = cn::select()
//!     .name("fruit")
//!     .placeholder("Choose a fruit...")
//!     .option(CallerOption::new("apple", "Apple"))
//!     .option(CallerOption::group("Citrus", vec![
//!         CallerOption::new("lemon", "Lemon"),
//!         CallerOption::new("lime", "Lime"),
//!     ]))
//!     .searchable(true)
//!     .value("lemon")
//!     .on_change(|event| println!("Selected: {}", event.target.value));
//!
//! // Mount once, render on every pass, drop on unmount
//! let instance = SelectInstance::mount_global(menu_host, &config);
//! let tree = instance.render(&config);
//! ```
//!
//! Without any of the advanced flags (async, searchable, multiple, custom
//! renderers, custom key extractor) the configuration is handed to the
//! plain select unchanged.

pub mod async_options;
pub mod event;
pub mod menu;
pub mod options;
pub mod resolve;
pub mod styles;

use std::sync::Arc;

use serde_json::Value;
use tessel_core::events::EventSurface;

pub use async_options::{AsyncOptionsGateway, CacheToken, OptionsLoader};
pub use event::{ChangeEvent, ChangeHandler, ChangeTarget, Selection};
pub use menu::{FloatingMenu, MenuPositionController, MenuState};
pub use options::{filter_options, normalize, parse_options, CallerOption, CanonicalOption};
pub use resolve::{find_option, resolve, KeyExtractor, ResolvedValue};
pub use styles::{ColorToken, SelectStyles};

/// Message shown when no option matches
const DEFAULT_NO_OPTIONS_MESSAGE: &str = "No options";

/// Renders an option (in the menu) or the current value (in the control) as text
pub type OptionRenderer = Arc<dyn Fn(&CanonicalOption) -> String + Send + Sync>;

/// Free-text filter over a canonical tree
pub type OptionFilter = fn(&[CanonicalOption], &str) -> Vec<CanonicalOption>;

/// Produces the empty-menu message for the current input text
pub type NoOptionsMessageFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Empty-menu message, as a literal or computed from the input text
#[derive(Clone)]
pub enum NoOptionsMessage {
    Text(String),
    Dynamic(NoOptionsMessageFn),
}

impl NoOptionsMessage {
    /// Normalize to a callable
    pub fn into_fn(self) -> NoOptionsMessageFn {
        match self {
            NoOptionsMessage::Text(text) => Arc::new(move |_| text.clone()),
            NoOptionsMessage::Dynamic(f) => f,
        }
    }
}

impl Default for NoOptionsMessage {
    fn default() -> Self {
        NoOptionsMessage::Text(DEFAULT_NO_OPTIONS_MESSAGE.to_string())
    }
}

impl From<&str> for NoOptionsMessage {
    fn from(text: &str) -> Self {
        NoOptionsMessage::Text(text.to_string())
    }
}

impl From<String> for NoOptionsMessage {
    fn from(text: String) -> Self {
        NoOptionsMessage::Text(text)
    }
}

impl std::fmt::Debug for NoOptionsMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NoOptionsMessage::Text(text) => f.debug_tuple("Text").field(text).finish(),
            NoOptionsMessage::Dynamic(_) => f.write_str("Dynamic"),
        }
    }
}

/// Props forwarded to the underlying widget untouched
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Passthrough {
    pub disabled: bool,
    pub loading: bool,
    pub placeholder: Option<String>,
    pub auto_focus: bool,
    pub style: Option<Value>,
    pub id: Option<String>,
    pub name: Option<String>,
}

/// Caller configuration for a select
///
/// Cheap to clone; callbacks are shared.
#[derive(Clone, Default)]
pub struct SelectConfig {
    options: Vec<CallerOption>,
    value: Option<Value>,
    default_value: Option<Value>,
    multiple: bool,
    async_mode: bool,
    loader: Option<OptionsLoader>,
    default_options: Option<Vec<CallerOption>>,
    cache_options: Option<CacheToken>,
    searchable: bool,
    get_option_value: Option<KeyExtractor>,
    option_renderer: Option<OptionRenderer>,
    value_renderer: Option<OptionRenderer>,
    no_options_message: Option<NoOptionsMessage>,
    error: bool,
    passthrough: Passthrough,
    default_menu_open: bool,
    on_change: Option<ChangeHandler>,
}

impl SelectConfig {
    /// Create an empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an option (leaf or group)
    pub fn option(mut self, option: CallerOption) -> Self {
        self.options.push(option);
        self
    }

    /// Add multiple options
    pub fn options(mut self, options: impl IntoIterator<Item = CallerOption>) -> Self {
        self.options.extend(options);
        self
    }

    /// Set the current raw value (a key, or an array of keys in multi mode)
    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Set the initial raw value for an uncontrolled select
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Allow several values
    pub fn multiple(mut self, multiple: bool) -> Self {
        self.multiple = multiple;
        self
    }

    /// Load options on demand instead of owning them
    pub fn async_mode(mut self, async_mode: bool) -> Self {
        self.async_mode = async_mode;
        self
    }

    /// Set the async query function
    pub fn load_options(mut self, loader: OptionsLoader) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Options shown in async mode before the first query
    pub fn default_options(mut self, options: impl IntoIterator<Item = CallerOption>) -> Self {
        self.default_options = Some(options.into_iter().collect());
        self
    }

    /// Cache async results while `token` stays the same (`None` disables)
    pub fn cache_options(mut self, token: Option<CacheToken>) -> Self {
        self.cache_options = token;
        self
    }

    /// Enable free-text filtering
    pub fn searchable(mut self, searchable: bool) -> Self {
        self.searchable = searchable;
        self
    }

    /// Override the key extractor
    pub fn get_option_value(mut self, key: KeyExtractor) -> Self {
        self.get_option_value = Some(key);
        self
    }

    /// Custom rendering for menu options
    pub fn option_renderer<F>(mut self, f: F) -> Self
    where
        F: Fn(&CanonicalOption) -> String + Send + Sync + 'static,
    {
        self.option_renderer = Some(Arc::new(f));
        self
    }

    /// Custom rendering for the current value
    pub fn value_renderer<F>(mut self, f: F) -> Self
    where
        F: Fn(&CanonicalOption) -> String + Send + Sync + 'static,
    {
        self.value_renderer = Some(Arc::new(f));
        self
    }

    /// Set the empty-menu message
    pub fn no_options_message(mut self, message: impl Into<NoOptionsMessage>) -> Self {
        self.no_options_message = Some(message.into());
        self
    }

    /// Show the error state
    pub fn error(mut self, error: bool) -> Self {
        self.error = error;
        self
    }

    /// Set disabled state
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.passthrough.disabled = disabled;
        self
    }

    /// Show the loading indicator
    pub fn loading(mut self, loading: bool) -> Self {
        self.passthrough.loading = loading;
        self
    }

    /// Set the placeholder text
    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.passthrough.placeholder = Some(placeholder.into());
        self
    }

    /// Focus on mount
    pub fn auto_focus(mut self, auto_focus: bool) -> Self {
        self.passthrough.auto_focus = auto_focus;
        self
    }

    /// Opaque style object for the control
    pub fn style(mut self, style: Value) -> Self {
        self.passthrough.style = Some(style);
        self
    }

    /// Set the element id
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.passthrough.id = Some(id.into());
        self
    }

    /// Set the form field name carried by change events
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.passthrough.name = Some(name.into());
        self
    }

    /// Start with the menu open
    pub fn default_menu_open(mut self, open: bool) -> Self {
        self.default_menu_open = open;
        self
    }

    /// Set the change callback
    pub fn on_change<F>(mut self, callback: F) -> Self
    where
        F: Fn(&ChangeEvent) + Send + Sync + 'static,
    {
        self.on_change = Some(Arc::new(callback));
        self
    }

    /// Whether any option requires the full dropdown
    pub fn needs_dropdown(&self) -> bool {
        self.async_mode
            || self.searchable
            || self.multiple
            || self.option_renderer.is_some()
            || self.value_renderer.is_some()
            || self.get_option_value.is_some()
    }

    /// The caller's option tree
    pub fn option_tree(&self) -> &[CallerOption] {
        &self.options
    }

    /// The caller's raw value
    pub fn raw_value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// The caller's raw default value
    pub fn raw_default_value(&self) -> Option<&Value> {
        self.default_value.as_ref()
    }

    /// Props forwarded to the widget
    pub fn passthrough(&self) -> &Passthrough {
        &self.passthrough
    }

    /// The caller's change callback
    pub fn change_handler(&self) -> Option<&ChangeHandler> {
        self.on_change.as_ref()
    }

    fn key_extractor(&self) -> KeyExtractor {
        self.get_option_value.clone().unwrap_or_default()
    }

    fn widget_value(
        &self,
        raw: Option<&Value>,
        options: &[CanonicalOption],
        key: &KeyExtractor,
    ) -> WidgetValue {
        if self.async_mode {
            WidgetValue::Opaque(raw.cloned().unwrap_or(Value::Null))
        } else {
            WidgetValue::Resolved(resolve(raw, options, key, self.multiple))
        }
    }
}

impl std::fmt::Debug for SelectConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectConfig")
            .field("options", &self.options.len())
            .field("value", &self.value)
            .field("multiple", &self.multiple)
            .field("async_mode", &self.async_mode)
            .field("searchable", &self.searchable)
            .field("cache_options", &self.cache_options)
            .field("error", &self.error)
            .field("passthrough", &self.passthrough)
            .finish_non_exhaustive()
    }
}

/// The current value as the dropdown receives it
#[derive(Clone, Debug, PartialEq)]
pub enum WidgetValue {
    /// Resolved against the canonical options
    Resolved(ResolvedValue),
    /// Async mode: the caller's value, untouched
    Opaque(Value),
}

/// Everything the dropdown widget needs to render one pass
#[derive(Clone)]
pub struct DropdownProps {
    pub options: Vec<CanonicalOption>,
    pub default_options: Option<Vec<CanonicalOption>>,
    pub value: WidgetValue,
    pub default_value: Option<WidgetValue>,
    pub is_multi: bool,
    pub is_searchable: bool,
    pub is_async: bool,
    pub styles: SelectStyles,
    pub no_options_message: NoOptionsMessageFn,
    pub get_option_value: KeyExtractor,
    pub option_renderer: Option<OptionRenderer>,
    pub value_renderer: Option<OptionRenderer>,
    /// Set in searchable mode
    pub filter: Option<OptionFilter>,
    pub passthrough: Passthrough,
    pub menu_is_open: bool,
    menu: MenuState,
    gateway: Option<AsyncOptionsGateway>,
    on_change: Option<ChangeHandler>,
}

impl DropdownProps {
    /// Report a selection from the widget
    ///
    /// Translates the records into a [`ChangeEvent`], hands it to the
    /// caller's callback and returns it.
    pub fn select(&self, selection: Selection) -> ChangeEvent {
        let event = ChangeEvent::from_selection(
            self.passthrough.name.as_deref(),
            &selection,
            &self.get_option_value,
            self.is_multi,
        );
        if let Some(ref cb) = self.on_change {
            cb(&event);
        }
        event
    }

    /// Menu-open signal from the widget
    pub fn open_menu(&self) {
        self.menu.open();
    }

    /// Menu-close signal from the widget
    pub fn close_menu(&self) {
        self.menu.close();
    }

    /// Options to show for the typed input
    ///
    /// Async mode queries the loader (empty input falls back to the default
    /// options when present); otherwise the local tree is filtered.
    pub async fn load_options(&self, input: &str) -> crate::Result<Vec<CanonicalOption>> {
        match (&self.gateway, &self.default_options) {
            (Some(_), Some(defaults)) if input.is_empty() => Ok(defaults.clone()),
            (Some(gateway), _) => gateway.load(input).await,
            (None, _) => Ok(match self.filter {
                Some(filter) => filter(&self.options, input),
                None => self.options.clone(),
            }),
        }
    }

    /// Empty-menu message for the typed input
    pub fn no_options_text(&self, input: &str) -> String {
        (self.no_options_message)(input)
    }

    /// Text for an option in the menu
    pub fn option_text(&self, option: &CanonicalOption) -> String {
        match &self.option_renderer {
            Some(render) => render(option),
            None => option.label.clone(),
        }
    }

    /// Text for a selected record in the control
    pub fn value_text(&self, option: &CanonicalOption) -> String {
        match &self.value_renderer {
            Some(render) => render(option),
            None => option.label.clone(),
        }
    }
}

impl std::fmt::Debug for DropdownProps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DropdownProps")
            .field("options", &self.options)
            .field("value", &self.value)
            .field("is_multi", &self.is_multi)
            .field("is_searchable", &self.is_searchable)
            .field("is_async", &self.is_async)
            .field("has_filter", &self.filter.is_some())
            .field("styles", &self.styles)
            .field("passthrough", &self.passthrough)
            .field("menu_is_open", &self.menu_is_open)
            .finish_non_exhaustive()
    }
}

/// What a render pass produces
#[derive(Debug)]
pub enum WidgetTree {
    /// Plain select, configuration passed through unchanged
    Simple(SelectConfig),
    /// Full dropdown bundle
    Dropdown(DropdownProps),
}

impl WidgetTree {
    /// The dropdown props, if this pass needs the full widget
    pub fn as_dropdown(&self) -> Option<&DropdownProps> {
        match self {
            WidgetTree::Dropdown(props) => Some(props),
            WidgetTree::Simple(_) => None,
        }
    }

    /// Whether this pass renders the plain select
    pub fn is_simple(&self) -> bool {
        matches!(self, WidgetTree::Simple(_))
    }
}

/// A mounted select
///
/// Owns the menu state, the menu position listeners and the async gateway
/// for as long as the component is mounted. Dropping the instance is the
/// unmount: the listeners are released on every exit path.
#[derive(Debug)]
pub struct SelectInstance {
    menu: MenuState,
    position: MenuPositionController,
    gateway: AsyncOptionsGateway,
}

impl SelectInstance {
    /// Mount against an explicit event surface
    pub fn mount(
        surface: &EventSurface,
        menu_host: Arc<dyn FloatingMenu>,
        config: &SelectConfig,
    ) -> Self {
        let menu = MenuState::new(config.default_menu_open);
        let position = MenuPositionController::acquire(surface, menu.clone(), menu_host);
        let gateway = AsyncOptionsGateway::new(config.loader.clone(), config.cache_options);
        Self {
            menu,
            position,
            gateway,
        }
    }

    /// Mount against the global event surface
    pub fn mount_global(menu_host: Arc<dyn FloatingMenu>, config: &SelectConfig) -> Self {
        Self::mount(EventSurface::global(), menu_host, config)
    }

    /// Build the widget description for this pass
    pub fn render(&self, config: &SelectConfig) -> WidgetTree {
        if !config.needs_dropdown() {
            tracing::trace!("select: plain widget");
            return WidgetTree::Simple(config.clone());
        }

        let key = config.key_extractor();
        let options = normalize(&config.options);
        let default_options = config.default_options.as_deref().map(normalize);

        let value = config.widget_value(config.value.as_ref(), &options, &key);
        let default_value = config
            .default_value
            .as_ref()
            .map(|raw| config.widget_value(Some(raw), &options, &key));

        let gateway = config.async_mode.then(|| {
            self.gateway.set_loader(config.loader.clone());
            self.gateway.set_cache_token(config.cache_options);
            self.gateway.clone()
        });

        tracing::trace!(
            "select: dropdown (multi={}, searchable={}, async={})",
            config.multiple,
            config.searchable,
            config.async_mode
        );

        WidgetTree::Dropdown(DropdownProps {
            options,
            default_options,
            value,
            default_value,
            is_multi: config.multiple,
            is_searchable: config.searchable,
            is_async: config.async_mode,
            styles: SelectStyles::for_state(config.error),
            no_options_message: config.no_options_message.clone().unwrap_or_default().into_fn(),
            get_option_value: key,
            option_renderer: config.option_renderer.clone(),
            value_renderer: config.value_renderer.clone(),
            filter: config.searchable.then_some(filter_options as OptionFilter),
            passthrough: config.passthrough.clone(),
            menu_is_open: self.menu.is_open(),
            menu: self.menu.clone(),
            gateway,
            on_change: config.on_change.clone(),
        })
    }

    /// The menu state owned by this instance
    pub fn menu_state(&self) -> &MenuState {
        &self.menu
    }

    /// The menu position listeners
    pub fn position_controller(&self) -> &MenuPositionController {
        &self.position
    }

    /// The async gateway (idle unless async mode is on)
    pub fn gateway(&self) -> &AsyncOptionsGateway {
        &self.gateway
    }
}

/// Create an empty select configuration
///
/// # Example
///
/// ```ignore
/// use tessel_cn::prelude::*;
///
/// let config = cn::select()
///     .name("country")
///     .options(countries)
///     .searchable(true)
///     .on_change(|e| println!("{:?}", e.target.value));
/// ```
pub fn select() -> SelectConfig {
    SelectConfig::new()
}
