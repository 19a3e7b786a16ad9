//! Application state management for Fleetwatch.
//!
//! This module contains the core `App` struct that manages all application
//! state: the authentication gate, cached fleet data, UI state (tabs,
//! focus, filters, forms), and background refresh coordination.

use std::collections::HashMap;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::auth::{AuthPhase, SavedLogin, SessionClient, SessionGate, SessionStore};
use crate::cache::{CacheAges, CacheManager};
use crate::config::Config;
use crate::models::{
    Delivery, DeliveryStatus, Robot, RobotStatus, Role, SensorEvent, User, UserPayload,
    SENSOR_TYPES,
};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
/// A full refresh produces well under this many messages.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Maximum length for username input.
const MAX_USERNAME_LENGTH: usize = 50;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

/// Maximum length for general form fields (names, e-mails, locations).
const MAX_FIELD_LENGTH: usize = 80;

/// Number of items to scroll on page up/down.
pub const PAGE_SCROLL_SIZE: usize = 10;

// ============================================================================
// UI State Types
// ============================================================================

/// Main navigation tabs of the authenticated tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Dashboard,
    Robots,
    Sensors,
    Deliveries,
    Users,
    Profile,
}

impl Tab {
    /// Get the display title for this tab.
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Dashboard => "Dashboard",
            Tab::Robots => "Robots",
            Tab::Sensors => "Sensors",
            Tab::Deliveries => "Deliveries",
            Tab::Users => "Users",
            Tab::Profile => "Profile",
        }
    }

    /// Get the next tab (wrapping around). The Users tab only exists for
    /// admins; for everyone else the cycle skips it.
    pub fn next(&self, admin: bool) -> Self {
        let next = match self {
            Tab::Dashboard => Tab::Robots,
            Tab::Robots => Tab::Sensors,
            Tab::Sensors => Tab::Deliveries,
            Tab::Deliveries => Tab::Users,
            Tab::Users => Tab::Profile,
            Tab::Profile => Tab::Dashboard,
        };
        if next == Tab::Users && !admin {
            Tab::Profile
        } else {
            next
        }
    }

    /// Get the previous tab (wrapping around), skipping Users for
    /// non-admins.
    pub fn prev(&self, admin: bool) -> Self {
        let prev = match self {
            Tab::Dashboard => Tab::Profile,
            Tab::Robots => Tab::Dashboard,
            Tab::Sensors => Tab::Robots,
            Tab::Deliveries => Tab::Sensors,
            Tab::Users => Tab::Deliveries,
            Tab::Profile => Tab::Users,
        };
        if prev == Tab::Users && !admin {
            Tab::Deliveries
        } else {
            prev
        }
    }
}

/// Current UI focus area (list panel or detail panel)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    List,
    Detail,
}

/// Overall application state within the authenticated tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    Searching,
    ShowingHelp,
    ConfirmingQuit,
    ConfirmingDelete,
    EditingUser,
    EditingLocation,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoginFocus {
    Username,
    Password,
    Button,
}

/// User form focus state, in visual order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserFormFocus {
    FullName,
    Username,
    Email,
    Phone,
    Role,
    Password,
    ConfirmPassword,
    Submit,
}

impl UserFormFocus {
    pub fn next(&self) -> Self {
        match self {
            UserFormFocus::FullName => UserFormFocus::Username,
            UserFormFocus::Username => UserFormFocus::Email,
            UserFormFocus::Email => UserFormFocus::Phone,
            UserFormFocus::Phone => UserFormFocus::Role,
            UserFormFocus::Role => UserFormFocus::Password,
            UserFormFocus::Password => UserFormFocus::ConfirmPassword,
            UserFormFocus::ConfirmPassword => UserFormFocus::Submit,
            UserFormFocus::Submit => UserFormFocus::FullName,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            UserFormFocus::FullName => UserFormFocus::Submit,
            UserFormFocus::Username => UserFormFocus::FullName,
            UserFormFocus::Email => UserFormFocus::Username,
            UserFormFocus::Phone => UserFormFocus::Email,
            UserFormFocus::Role => UserFormFocus::Phone,
            UserFormFocus::Password => UserFormFocus::Role,
            UserFormFocus::ConfirmPassword => UserFormFocus::Password,
            UserFormFocus::Submit => UserFormFocus::ConfirmPassword,
        }
    }
}

/// State of the user create/edit overlay.
#[derive(Debug, Clone)]
pub struct UserForm {
    /// `Some(id)` when editing an existing user, `None` when creating.
    pub editing_id: Option<i64>,
    pub full_name: String,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub role: Role,
    pub password: String,
    pub confirm_password: String,
    pub focus: UserFormFocus,
    pub error: Option<String>,
}

impl UserForm {
    pub fn new_user() -> Self {
        Self {
            editing_id: None,
            full_name: String::new(),
            username: String::new(),
            email: String::new(),
            phone: String::new(),
            role: Role::Operator,
            password: String::new(),
            confirm_password: String::new(),
            focus: UserFormFocus::FullName,
            error: None,
        }
    }

    pub fn for_user(user: &User) -> Self {
        Self {
            editing_id: user.id,
            full_name: user.full_name.clone().unwrap_or_default(),
            username: user.username.clone(),
            email: user.email.clone().unwrap_or_default(),
            phone: user.phone.clone().unwrap_or_default(),
            role: user.role,
            // Password left empty; only filled to change it
            password: String::new(),
            confirm_password: String::new(),
            focus: UserFormFocus::FullName,
            error: None,
        }
    }

    pub fn is_edit(&self) -> bool {
        self.editing_id.is_some()
    }

    /// The text buffer behind the focused field, when it is a text field.
    pub fn field_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            UserFormFocus::FullName => Some(&mut self.full_name),
            UserFormFocus::Username => Some(&mut self.username),
            UserFormFocus::Email => Some(&mut self.email),
            UserFormFocus::Phone => Some(&mut self.phone),
            UserFormFocus::Password => Some(&mut self.password),
            UserFormFocus::ConfirmPassword => Some(&mut self.confirm_password),
            UserFormFocus::Role | UserFormFocus::Submit => None,
        }
    }

    pub fn toggle_role(&mut self) {
        self.role = match self.role {
            Role::Admin => Role::Operator,
            Role::Operator => Role::Admin,
        };
    }

    /// Validate the form and build the request payload. Returns the first
    /// failing rule as a display message.
    pub fn validate(&self) -> std::result::Result<UserPayload, String> {
        if self.full_name.trim().is_empty() {
            return Err("Full name is required".to_string());
        }

        let username = self.username.trim();
        if username.is_empty() {
            return Err("Username is required".to_string());
        }
        if username.len() < 3 {
            return Err("Username must be at least 3 characters".to_string());
        }

        let email = self.email.trim();
        if email.is_empty() {
            return Err("Email is required".to_string());
        }
        if !Self::looks_like_email(email) {
            return Err("Email must be a valid address".to_string());
        }

        if self.is_edit() {
            // Password only validated when the admin is changing it
            if !self.password.is_empty() && self.password.len() < 6 {
                return Err("Password must be at least 6 characters".to_string());
            }
        } else {
            if self.password.is_empty() {
                return Err("Password is required".to_string());
            }
            if self.password.len() < 6 {
                return Err("Password must be at least 6 characters".to_string());
            }
        }
        if !self.password.is_empty() && self.password != self.confirm_password {
            return Err("Passwords do not match".to_string());
        }

        let phone = self.phone.trim();
        Ok(UserPayload {
            full_name: self.full_name.trim().to_string(),
            username: username.to_string(),
            email: email.to_string(),
            phone: (!phone.is_empty()).then(|| phone.to_string()),
            role: self.role,
            password: (!self.password.is_empty()).then(|| self.password.clone()),
        })
    }

    /// Same shape check the original form used: something@something.tld
    fn looks_like_email(email: &str) -> bool {
        let Some((local, domain)) = email.split_once('@') else {
            return false;
        };
        !local.is_empty()
            && !domain.is_empty()
            && domain.contains('.')
            && !domain.starts_with('.')
            && !domain.ends_with('.')
    }
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Result types from background refresh tasks, sent through an MPSC
/// channel back to the main loop.
enum RefreshResult {
    Robots(Vec<Robot>),
    Alerts(Vec<SensorEvent>),
    Deliveries(Vec<Delivery>),
    Users(Vec<User>),
    /// Recent readings for one robot (robot_id, events newest first)
    RecentReadings(i64, Vec<SensorEvent>),
    /// The server rejected our token mid-session
    SessionExpired,
    /// Signal that all refresh tasks have completed
    RefreshComplete,
    /// An error occurred during refresh
    Error(String),
}

/// Fleet-wide robot counts for the dashboard.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RobotStats {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
    pub maintenance: usize,
    pub in_operation: usize,
}

// ============================================================================
// Main Application Struct
// ============================================================================

/// Main application state container
pub struct App {
    // Core services
    pub config: Config,
    pub gate: SessionGate,
    pub api: ApiClient,
    pub cache: CacheManager,

    // UI State
    pub state: AppState,
    pub current_tab: Tab,
    pub focus: Focus,
    pub search_query: String,
    pub robot_status_filter: Option<RobotStatus>,
    /// Index into SENSOR_TYPES, or None for all types
    pub sensor_type_filter: Option<usize>,
    pub delivery_status_filter: Option<DeliveryStatus>,

    // Login form state
    pub login_username: String,
    pub login_password: String,
    pub login_focus: LoginFocus,
    pub login_error: Option<String>,

    // User form overlay state
    pub user_form: UserForm,

    // Location editor overlay state
    pub location_input: String,

    // Selection indices
    pub robot_selection: usize,
    pub sensor_selection: usize,
    pub delivery_selection: usize,
    pub user_selection: usize,

    // Fetched data
    pub robots: Vec<Robot>,
    pub alerts: Vec<SensorEvent>,
    pub deliveries: Vec<Delivery>,
    pub users: Vec<User>,
    /// Recent readings per robot, for the sensor detail sparkline
    pub recent_readings: HashMap<i64, Vec<SensorEvent>>,

    // Background task channel
    refresh_rx: mpsc::Receiver<RefreshResult>,
    refresh_tx: mpsc::Sender<RefreshResult>,

    // Status message
    pub status_message: Option<String>,

    // Cache ages for status bar
    pub cache_ages: CacheAges,
}

impl App {
    /// Create a new application instance
    pub fn new() -> Result<Self> {
        debug!("App::new() starting");
        let config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };

        let base_url = config.api_base_url();
        debug!(base_url = %base_url, "Backend configured");

        let cache_dir = config
            .cache_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("./cache"));

        let mut api = ApiClient::new(base_url)?;
        let store = SessionStore::new(cache_dir.join("session"));
        let gate = SessionGate::new(SessionClient::new(api.clone(), store));

        // A stored token is attached optimistically; bootstrap decides
        // whether the session is actually still good
        if let Some(token) = gate.token() {
            api.set_token(token);
        }

        let cache = CacheManager::new(cache_dir.join("data"))?;

        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        // Prefill the login form from env vars, the config, and the keychain
        let login_username = std::env::var("FLEETWATCH_USERNAME")
            .ok()
            .or_else(|| config.last_username.clone())
            .unwrap_or_default();

        let login_password = std::env::var("FLEETWATCH_PASSWORD")
            .ok()
            .or_else(|| {
                (!login_username.is_empty())
                    .then(|| SavedLogin::password_for(&login_username))
                    .flatten()
            })
            .unwrap_or_default();

        Ok(Self {
            config,
            gate,
            api,
            cache,

            state: AppState::Normal,
            current_tab: Tab::Dashboard,
            focus: Focus::List,
            search_query: String::new(),
            robot_status_filter: None,
            sensor_type_filter: None,
            delivery_status_filter: None,

            login_username,
            login_password,
            login_focus: LoginFocus::Username,
            login_error: None,

            user_form: UserForm::new_user(),
            location_input: String::new(),

            robot_selection: 0,
            sensor_selection: 0,
            delivery_selection: 0,
            user_selection: 0,

            robots: Vec::new(),
            alerts: Vec::new(),
            deliveries: Vec::new(),
            users: Vec::new(),
            recent_readings: HashMap::new(),

            refresh_rx: rx,
            refresh_tx: tx,

            status_message: None,
            cache_ages: CacheAges::default(),
        })
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Resolve the boot phase before the first frame. Must run before the
    /// UI loop so the router never has to draw an unresolved state.
    pub async fn bootstrap(&mut self) {
        self.gate.bootstrap().await;

        match self.gate.phase() {
            AuthPhase::Authenticated => {
                if let Some(token) = self.gate.token() {
                    self.api.set_token(token);
                }
                if self.is_cache_stale() {
                    self.refresh_all_background();
                }
            }
            _ => {
                self.api.clear_token();
                self.start_login();
            }
        }
    }

    /// Reset the login form for a fresh attempt.
    pub fn start_login(&mut self) {
        self.login_focus = if self.login_username.is_empty() {
            LoginFocus::Username
        } else {
            LoginFocus::Password
        };
        self.login_error = None;
    }

    /// Attempt login with the credentials from the login form
    pub async fn attempt_login(&mut self) {
        let username = self.login_username.trim().to_string();
        let password = self.login_password.clone();

        if username.is_empty() || password.is_empty() {
            self.login_error = Some("Username and password required".to_string());
            return;
        }

        self.login_error = None;

        match self.gate.sign_in(&username, &password).await {
            Ok(()) => {
                SavedLogin::remember(&username, &password);

                self.config.last_username = Some(username);
                if let Err(e) = self.config.save() {
                    warn!(error = %e, "Failed to save config");
                }

                if let Some(token) = self.gate.token() {
                    self.api.set_token(token);
                }

                self.login_password.clear();
                self.state = AppState::Normal;
                self.current_tab = Tab::Dashboard;
                self.refresh_all_background();
            }
            Err(e) => {
                error!(error = %e, "Login failed");
                if e.is_auth() {
                    // A remembered password the server rejects is stale
                    SavedLogin::forget(&username);
                }
                self.login_error = Some(e.user_message());
            }
        }
    }

    /// Sign out and return to the entry screen.
    pub async fn sign_out(&mut self) {
        self.gate.sign_out().await;
        self.api.clear_token();

        // Per-session data goes away with the session
        self.users.clear();
        self.recent_readings.clear();
        self.state = AppState::Normal;
        self.current_tab = Tab::Dashboard;
        self.start_login();
    }

    /// Route back to the entry screen after the server stopped accepting
    /// our token. No dialog; the status line explains what happened.
    async fn handle_session_expiry(&mut self) {
        warn!("Session no longer accepted by the server");
        self.sign_out().await;
        self.status_message = Some("Session expired. Please sign in again.".to_string());
    }

    pub fn is_admin(&self) -> bool {
        self.gate.is_admin()
    }

    // =========================================================================
    // Cache Management
    // =========================================================================

    /// Load all data from cache
    pub fn load_from_cache(&mut self) {
        if let Some(cached) = self.cache.load_robots() {
            self.robots = cached.data;
        }
        if let Some(cached) = self.cache.load_alerts() {
            self.alerts = cached.data;
        }
        if let Some(cached) = self.cache.load_deliveries() {
            self.deliveries = cached.data;
        }
        self.cache_ages = self.cache.get_cache_ages();
    }

    /// Check if any cache data is stale
    pub fn is_cache_stale(&self) -> bool {
        self.cache.any_stale()
    }

    // =========================================================================
    // Background Data Refresh
    // =========================================================================

    /// Spawn a background task to refresh all data
    pub fn refresh_all_background(&mut self) {
        let token = match self.gate.token() {
            Some(t) => t,
            None => {
                warn!("No token available for refresh");
                return;
            }
        };

        info!("Starting background refresh of all data");

        let api = self.api.with_token(token);
        let admin = self.is_admin();
        let tx = self.refresh_tx.clone();

        tokio::spawn(async move {
            Self::execute_background_refresh(tx, api, admin).await;
        });

        self.status_message = Some("Refreshing data...".to_string());
    }

    /// Helper to send refresh results, logging any channel errors
    async fn send_result(tx: &mpsc::Sender<RefreshResult>, result: RefreshResult) {
        if let Err(e) = tx.send(result).await {
            error!(error = %e, "Failed to send refresh result - channel closed");
        }
    }

    /// Forward a fetch outcome to the main loop. A server rejection means
    /// the token died mid-session and is routed as expiry, not as a
    /// generic error.
    async fn send_fetch_result<T>(
        tx: &mpsc::Sender<RefreshResult>,
        what: &str,
        result: std::result::Result<T, ApiError>,
        wrap: impl FnOnce(T) -> RefreshResult,
    ) {
        match result {
            Ok(data) => Self::send_result(tx, wrap(data)).await,
            Err(e) if e.is_auth() => {
                warn!(what, error = %e, "Fetch rejected; session expired");
                Self::send_result(tx, RefreshResult::SessionExpired).await;
            }
            Err(e) => {
                error!(what, error = %e, "Fetch failed");
                Self::send_result(tx, RefreshResult::Error(e.user_message())).await;
            }
        }
    }

    /// Execute the background refresh task. Runs in a spawned Tokio task;
    /// the three main collections are fetched in parallel over the shared
    /// connection pool, users only for admins.
    async fn execute_background_refresh(
        tx: mpsc::Sender<RefreshResult>,
        api: ApiClient,
        admin: bool,
    ) {
        let (robots_res, alerts_res, deliveries_res) = tokio::join!(
            api.fetch_robots(),
            api.fetch_critical_alerts(),
            api.fetch_deliveries(),
        );

        Self::send_fetch_result(&tx, "robots", robots_res, RefreshResult::Robots).await;
        Self::send_fetch_result(&tx, "alerts", alerts_res, RefreshResult::Alerts).await;
        Self::send_fetch_result(&tx, "deliveries", deliveries_res, RefreshResult::Deliveries).await;

        if admin {
            let users_res = api.list_users().await;
            Self::send_fetch_result(&tx, "users", users_res, RefreshResult::Users).await;
        }

        debug!("Background refresh complete");
        Self::send_result(&tx, RefreshResult::RefreshComplete).await;
    }

    /// Fetch the recent readings for one robot (sensor detail sparkline).
    pub fn fetch_recent_readings(&mut self, robot_id: i64) {
        let token = match self.gate.token() {
            Some(t) => t,
            None => return,
        };

        let api = self.api.with_token(token);
        let tx = self.refresh_tx.clone();

        tokio::spawn(async move {
            let result = api.fetch_latest_readings(robot_id).await;
            Self::send_fetch_result(&tx, "readings", result, |events| {
                RefreshResult::RecentReadings(robot_id, events)
            })
            .await;
        });
    }

    /// Drain and apply any completed background work.
    pub async fn check_background_tasks(&mut self) {
        let mut results = Vec::new();
        while let Ok(result) = self.refresh_rx.try_recv() {
            results.push(result);
        }

        for result in results {
            if matches!(result, RefreshResult::SessionExpired) {
                self.handle_session_expiry().await;
                continue;
            }
            self.process_refresh_result(result);
        }
    }

    /// Apply a single refresh result: cache it and replace the view copy.
    fn process_refresh_result(&mut self, result: RefreshResult) {
        match result {
            RefreshResult::Robots(data) => {
                self.cache.save_robots(&data);
                self.robots = data;
                self.cache_ages = self.cache.get_cache_ages();
            }
            RefreshResult::Alerts(data) => {
                self.cache.save_alerts(&data);
                self.alerts = data;
                self.cache_ages = self.cache.get_cache_ages();
            }
            RefreshResult::Deliveries(data) => {
                self.cache.save_deliveries(&data);
                self.deliveries = data;
                self.cache_ages = self.cache.get_cache_ages();
            }
            RefreshResult::Users(data) => {
                self.users = data;
            }
            RefreshResult::RecentReadings(robot_id, events) => {
                self.recent_readings.insert(robot_id, events);
            }
            RefreshResult::RefreshComplete => {
                // Only clear progress messages, preserve errors
                if let Some(ref msg) = self.status_message {
                    if !msg.starts_with("Error:") && !msg.starts_with("Session expired") {
                        self.status_message = None;
                    }
                }
            }
            RefreshResult::Error(msg) => {
                self.status_message = Some(format!("Error: {}", msg));
            }
            RefreshResult::SessionExpired => {
                // Handled in check_background_tasks
            }
        }
    }

    // =========================================================================
    // Data Actions
    // =========================================================================

    /// Apply a mutation result: refresh on success, surface rejections.
    async fn apply_mutation(&mut self, what: &str, result: std::result::Result<(), ApiError>) {
        match result {
            Ok(()) => {
                self.refresh_all_background();
            }
            Err(e) if e.is_auth() => {
                self.handle_session_expiry().await;
            }
            Err(e) => {
                error!(what, error = %e, "Mutation failed");
                self.status_message = Some(format!("Error: {}", e.user_message()));
            }
        }
    }

    /// Toggle the selected robot between active and inactive.
    pub async fn toggle_selected_robot(&mut self) {
        let Some((id, status)) = self.selected_robot().map(|r| (r.id, r.status)) else {
            return;
        };

        let Some(new_status) = status.toggled() else {
            self.status_message =
                Some("Robots in maintenance or operation cannot be toggled".to_string());
            return;
        };

        let result = self.api.update_robot_status(id, new_status).await;
        self.apply_mutation("robot status", result).await;
    }

    /// Open the location editor for the selected robot.
    pub fn open_location_editor(&mut self) {
        if let Some(robot) = self.selected_robot() {
            self.location_input = robot.location.clone().unwrap_or_default();
            self.state = AppState::EditingLocation;
        }
    }

    /// Save the location editor's value for the selected robot.
    pub async fn submit_location_update(&mut self) {
        let Some(id) = self.selected_robot().map(|r| r.id) else {
            self.state = AppState::Normal;
            return;
        };

        let location = self.location_input.trim().to_string();
        if location.is_empty() {
            self.status_message = Some("Location cannot be empty".to_string());
            return;
        }

        self.state = AppState::Normal;
        let result = self.api.update_robot_location(id, &location).await;
        self.apply_mutation("robot location", result).await;
    }

    /// Advance the selected delivery along its lifecycle
    /// (pending -> in progress -> completed).
    pub async fn advance_selected_delivery(&mut self) {
        let Some((id, status)) = self.selected_delivery().map(|d| (d.id, d.status)) else {
            return;
        };

        let Some(new_status) = status.advanced() else {
            self.status_message = Some("This delivery is already settled".to_string());
            return;
        };

        let result = self.api.update_delivery_status(id, new_status).await;
        self.apply_mutation("delivery status", result).await;
    }

    // =========================================================================
    // User Management
    // =========================================================================

    pub fn open_new_user_form(&mut self) {
        self.user_form = UserForm::new_user();
        self.state = AppState::EditingUser;
    }

    pub fn open_edit_user_form(&mut self) {
        if let Some(user) = self.selected_user() {
            self.user_form = UserForm::for_user(user);
            self.state = AppState::EditingUser;
        }
    }

    /// Validate and submit the user form (create or update).
    pub async fn submit_user_form(&mut self) {
        let payload = match self.user_form.validate() {
            Ok(payload) => payload,
            Err(message) => {
                self.user_form.error = Some(message);
                return;
            }
        };

        let result = match self.user_form.editing_id {
            Some(id) => self.gate.session().update_user(id, &payload).await,
            None => self.gate.session().register_user(&payload).await,
        };

        match result {
            Ok(user) => {
                info!(username = %user.username, "User saved");
                self.state = AppState::Normal;
                self.status_message = Some(format!("Saved user {}", user.username));
                self.refresh_all_background();
            }
            Err(e) => {
                error!(error = %e, "User save failed");
                self.user_form.error = Some(e.user_message());
            }
        }
    }

    /// Delete the selected user (after confirmation).
    pub async fn delete_selected_user(&mut self) {
        let Some(id) = self.selected_user().and_then(|u| u.id) else {
            return;
        };

        match self.gate.session().delete_user(id).await {
            Ok(()) => {
                self.status_message = Some("User removed".to_string());
                self.refresh_all_background();
            }
            Err(e) => {
                error!(error = %e, "User delete failed");
                self.status_message = Some(format!("Error: {}", e.user_message()));
            }
        }
    }

    // =========================================================================
    // Filtered Views and Selections
    // =========================================================================

    pub fn filtered_robots(&self) -> Vec<&Robot> {
        self.robots
            .iter()
            .filter(|r| r.matches_search(&self.search_query))
            .filter(|r| {
                self.robot_status_filter
                    .map(|status| r.status == status)
                    .unwrap_or(true)
            })
            .collect()
    }

    pub fn filtered_alerts(&self) -> Vec<&SensorEvent> {
        let type_filter = self.sensor_type_filter.map(|i| SENSOR_TYPES[i]);
        self.alerts
            .iter()
            .filter(|e| e.matches_search(&self.search_query))
            .filter(|e| type_filter.map(|t| e.sensor_type == t).unwrap_or(true))
            .collect()
    }

    pub fn filtered_deliveries(&self) -> Vec<&Delivery> {
        self.deliveries
            .iter()
            .filter(|d| d.matches_search(&self.search_query))
            .filter(|d| {
                self.delivery_status_filter
                    .map(|status| d.status == status)
                    .unwrap_or(true)
            })
            .collect()
    }

    pub fn selected_robot(&self) -> Option<&Robot> {
        self.filtered_robots().get(self.robot_selection).copied()
    }

    pub fn selected_alert(&self) -> Option<&SensorEvent> {
        self.filtered_alerts().get(self.sensor_selection).copied()
    }

    pub fn selected_delivery(&self) -> Option<&Delivery> {
        self.filtered_deliveries()
            .get(self.delivery_selection)
            .copied()
    }

    pub fn selected_user(&self) -> Option<&User> {
        self.users.get(self.user_selection)
    }

    /// Length of the list on the current tab.
    pub fn current_list_len(&self) -> usize {
        match self.current_tab {
            Tab::Dashboard | Tab::Profile => 0,
            Tab::Robots => self.filtered_robots().len(),
            Tab::Sensors => self.filtered_alerts().len(),
            Tab::Deliveries => self.filtered_deliveries().len(),
            Tab::Users => self.users.len(),
        }
    }

    fn current_selection_mut(&mut self) -> Option<&mut usize> {
        match self.current_tab {
            Tab::Dashboard | Tab::Profile => None,
            Tab::Robots => Some(&mut self.robot_selection),
            Tab::Sensors => Some(&mut self.sensor_selection),
            Tab::Deliveries => Some(&mut self.delivery_selection),
            Tab::Users => Some(&mut self.user_selection),
        }
    }

    /// Move the current tab's selection, clamped to the list bounds.
    pub fn move_selection(&mut self, delta: isize) {
        let len = self.current_list_len();
        if let Some(selection) = self.current_selection_mut() {
            if len == 0 {
                *selection = 0;
                return;
            }
            let current = *selection as isize;
            let moved = (current + delta).clamp(0, len as isize - 1);
            *selection = moved as usize;
        }
    }

    /// Clamp all selections after a filter or data change.
    pub fn clamp_selections(&mut self) {
        let robots = self.filtered_robots().len();
        let alerts = self.filtered_alerts().len();
        let deliveries = self.filtered_deliveries().len();
        let users = self.users.len();
        self.robot_selection = self.robot_selection.min(robots.saturating_sub(1));
        self.sensor_selection = self.sensor_selection.min(alerts.saturating_sub(1));
        self.delivery_selection = self.delivery_selection.min(deliveries.saturating_sub(1));
        self.user_selection = self.user_selection.min(users.saturating_sub(1));
    }

    // =========================================================================
    // Filters
    // =========================================================================

    /// Cycle the robot status filter: all -> each status -> all.
    pub fn cycle_robot_status_filter(&mut self) {
        let statuses = RobotStatus::all();
        self.robot_status_filter = match self.robot_status_filter {
            None => Some(statuses[0]),
            Some(current) => {
                let idx = statuses.iter().position(|s| *s == current).unwrap_or(0);
                statuses.get(idx + 1).copied()
            }
        };
        self.robot_selection = 0;
    }

    /// Cycle the sensor type filter through the known types.
    pub fn cycle_sensor_type_filter(&mut self) {
        self.sensor_type_filter = match self.sensor_type_filter {
            None => Some(0),
            Some(i) if i + 1 < SENSOR_TYPES.len() => Some(i + 1),
            Some(_) => None,
        };
        self.sensor_selection = 0;
    }

    /// Cycle the delivery status filter: all -> each status -> all.
    pub fn cycle_delivery_status_filter(&mut self) {
        let statuses = DeliveryStatus::all();
        self.delivery_status_filter = match self.delivery_status_filter {
            None => Some(statuses[0]),
            Some(current) => {
                let idx = statuses.iter().position(|s| *s == current).unwrap_or(0);
                statuses.get(idx + 1).copied()
            }
        };
        self.delivery_selection = 0;
    }

    // =========================================================================
    // Dashboard
    // =========================================================================

    /// Fleet-wide robot counts.
    pub fn robot_stats(&self) -> RobotStats {
        let mut stats = RobotStats {
            total: self.robots.len(),
            ..Default::default()
        };
        for robot in &self.robots {
            match robot.status {
                RobotStatus::Active => stats.active += 1,
                RobotStatus::Inactive => stats.inactive += 1,
                RobotStatus::Maintenance => stats.maintenance += 1,
                RobotStatus::InOperation => stats.in_operation += 1,
            }
        }
        stats
    }

    /// Critical alerts currently known.
    pub fn critical_alert_count(&self) -> usize {
        self.alerts
            .iter()
            .filter(|e| e.status == crate::models::SensorStatus::Critical)
            .count()
    }

    /// Deliveries not yet settled.
    pub fn open_delivery_count(&self) -> usize {
        self.deliveries
            .iter()
            .filter(|d| {
                matches!(
                    d.status,
                    DeliveryStatus::Pending | DeliveryStatus::InProgress | DeliveryStatus::Late
                )
            })
            .count()
    }
}

// ============================================================================
// Input validation helpers
// ============================================================================

pub fn can_add_username_char(current_len: usize, c: char) -> bool {
    current_len < MAX_USERNAME_LENGTH && !c.is_control()
}

pub fn can_add_password_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PASSWORD_LENGTH && !c.is_control()
}

pub fn can_add_field_char(current_len: usize, c: char) -> bool {
    current_len < MAX_FIELD_LENGTH && !c.is_control()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RobotRef;

    fn robot(id: i64, code: &str, status: RobotStatus) -> Robot {
        Robot {
            id,
            code: code.to_string(),
            model: "CargoMax 3".to_string(),
            status,
            location: None,
            battery_level: Some(50),
        }
    }

    #[test]
    fn test_tab_cycle_skips_users_for_operators() {
        assert_eq!(Tab::Deliveries.next(true), Tab::Users);
        assert_eq!(Tab::Deliveries.next(false), Tab::Profile);
        assert_eq!(Tab::Profile.prev(true), Tab::Users);
        assert_eq!(Tab::Profile.prev(false), Tab::Deliveries);
    }

    #[test]
    fn test_tab_cycle_round_trips() {
        let mut tab = Tab::Dashboard;
        for _ in 0..6 {
            tab = tab.next(true);
        }
        assert_eq!(tab, Tab::Dashboard);
    }

    #[tokio::test]
    async fn test_robot_stats_counts_by_status() {
        let mut app = test_app();
        app.robots = vec![
            robot(1, "RBT-001", RobotStatus::Active),
            robot(2, "RBT-002", RobotStatus::Active),
            robot(3, "RBT-003", RobotStatus::Maintenance),
            robot(4, "RBT-004", RobotStatus::InOperation),
            robot(5, "RBT-005", RobotStatus::Inactive),
        ];
        assert_eq!(
            app.robot_stats(),
            RobotStats {
                total: 5,
                active: 2,
                inactive: 1,
                maintenance: 1,
                in_operation: 1
            }
        );
    }

    #[test]
    fn test_user_form_validation_rules() {
        let mut form = UserForm::new_user();
        assert_eq!(form.validate().unwrap_err(), "Full name is required");

        form.full_name = "Alice Prado".to_string();
        assert_eq!(form.validate().unwrap_err(), "Username is required");

        form.username = "al".to_string();
        assert_eq!(
            form.validate().unwrap_err(),
            "Username must be at least 3 characters"
        );

        form.username = "alice".to_string();
        assert_eq!(form.validate().unwrap_err(), "Email is required");

        form.email = "not-an-email".to_string();
        assert_eq!(form.validate().unwrap_err(), "Email must be a valid address");

        form.email = "alice@example.com".to_string();
        assert_eq!(form.validate().unwrap_err(), "Password is required");

        form.password = "12345".to_string();
        assert_eq!(
            form.validate().unwrap_err(),
            "Password must be at least 6 characters"
        );

        form.password = "123456".to_string();
        form.confirm_password = "different".to_string();
        assert_eq!(form.validate().unwrap_err(), "Passwords do not match");

        form.confirm_password = "123456".to_string();
        let payload = form.validate().unwrap();
        assert_eq!(payload.username, "alice");
        assert_eq!(payload.password.as_deref(), Some("123456"));
        assert_eq!(payload.phone, None);
    }

    #[test]
    fn test_user_form_edit_allows_empty_password() {
        let user = User {
            id: Some(3),
            full_name: Some("Alice Prado".to_string()),
            username: "alice".to_string(),
            email: Some("alice@example.com".to_string()),
            phone: Some("11987654321".to_string()),
            role: Role::Operator,
        };
        let form = UserForm::for_user(&user);
        assert!(form.is_edit());

        let payload = form.validate().unwrap();
        // Leaving the password blank keeps the old one
        assert_eq!(payload.password, None);
        assert_eq!(payload.phone.as_deref(), Some("11987654321"));
    }

    #[test]
    fn test_email_shape_check() {
        assert!(UserForm::looks_like_email("a@b.co"));
        assert!(!UserForm::looks_like_email("a@b"));
        assert!(!UserForm::looks_like_email("@b.co"));
        assert!(!UserForm::looks_like_email("a@.co"));
        assert!(!UserForm::looks_like_email("ab.co"));
    }

    #[test]
    fn test_input_length_caps() {
        assert!(can_add_username_char(0, 'a'));
        assert!(!can_add_username_char(MAX_USERNAME_LENGTH, 'a'));
        assert!(!can_add_password_char(0, '\n'));
        assert!(can_add_password_char(MAX_PASSWORD_LENGTH - 1, 'x'));
        assert!(!can_add_field_char(MAX_FIELD_LENGTH, 'x'));
    }

    fn alert(id: i64, code: &str, sensor_type: &str, status: crate::models::SensorStatus) -> SensorEvent {
        SensorEvent {
            id,
            robot: RobotRef {
                id: Some(id),
                code: code.to_string(),
            },
            sensor_type: sensor_type.to_string(),
            reading: Some(1.0),
            status,
            timestamp: None,
            location: None,
        }
    }

    #[tokio::test]
    async fn test_filters_compose_search_and_status() {
        let mut app = test_app();
        app.robots = vec![
            robot(1, "RBT-001", RobotStatus::Active),
            robot(2, "RBT-002", RobotStatus::Inactive),
            robot(3, "XB-900", RobotStatus::Active),
        ];

        assert_eq!(app.filtered_robots().len(), 3);

        app.search_query = "rbt".to_string();
        assert_eq!(app.filtered_robots().len(), 2);

        app.robot_status_filter = Some(RobotStatus::Active);
        let filtered = app.filtered_robots();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].code, "RBT-001");
    }

    #[tokio::test]
    async fn test_sensor_type_filter_cycles_back_to_all() {
        let mut app = test_app();
        app.alerts = vec![
            alert(1, "RBT-001", "Temperatura", crate::models::SensorStatus::Critical),
            alert(2, "RBT-002", "Peso", crate::models::SensorStatus::Alert),
        ];

        assert!(app.sensor_type_filter.is_none());
        for _ in 0..SENSOR_TYPES.len() {
            app.cycle_sensor_type_filter();
            assert!(app.sensor_type_filter.is_some());
        }
        app.cycle_sensor_type_filter();
        assert!(app.sensor_type_filter.is_none());

        app.sensor_type_filter = Some(1); // Temperatura
        assert_eq!(app.filtered_alerts().len(), 1);
    }

    #[tokio::test]
    async fn test_move_selection_clamps() {
        let mut app = test_app();
        app.current_tab = Tab::Robots;
        app.robots = vec![
            robot(1, "RBT-001", RobotStatus::Active),
            robot(2, "RBT-002", RobotStatus::Active),
        ];

        app.move_selection(1);
        assert_eq!(app.robot_selection, 1);
        app.move_selection(10);
        assert_eq!(app.robot_selection, 1);
        app.move_selection(-10);
        assert_eq!(app.robot_selection, 0);
    }

    #[tokio::test]
    async fn test_open_and_critical_counts() {
        let mut app = test_app();
        app.alerts = vec![
            alert(1, "RBT-001", "Temperatura", crate::models::SensorStatus::Critical),
            alert(2, "RBT-002", "Peso", crate::models::SensorStatus::Alert),
        ];
        app.deliveries = vec![delivery(1, DeliveryStatus::Pending), delivery(2, DeliveryStatus::Completed)];

        assert_eq!(app.critical_alert_count(), 1);
        assert_eq!(app.open_delivery_count(), 1);
    }

    fn delivery(id: i64, status: DeliveryStatus) -> Delivery {
        Delivery {
            id,
            order_code: format!("PED-{:04}", id),
            robot: RobotRef {
                id: Some(1),
                code: "RBT-001".to_string(),
            },
            origin: "CD Norte".to_string(),
            destination: "Loja 18".to_string(),
            distance_km: Some(2.0),
            status,
            started_at: None,
            finished_at: None,
            notes: None,
        }
    }

    /// App wired to throwaway dirs and an unreachable backend; plenty for
    /// exercising pure state logic.
    fn test_app() -> App {
        let dir = tempfile::tempdir().unwrap();
        let api = ApiClient::new("http://127.0.0.1:9/api").unwrap();
        let store = SessionStore::new(dir.path().join("session"));
        let gate = SessionGate::new(SessionClient::new(api.clone(), store));
        let cache = CacheManager::new(dir.path().join("data")).unwrap();
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        App {
            config: Config::default(),
            gate,
            api,
            cache,
            state: AppState::Normal,
            current_tab: Tab::Dashboard,
            focus: Focus::List,
            search_query: String::new(),
            robot_status_filter: None,
            sensor_type_filter: None,
            delivery_status_filter: None,
            login_username: String::new(),
            login_password: String::new(),
            login_focus: LoginFocus::Username,
            login_error: None,
            user_form: UserForm::new_user(),
            location_input: String::new(),
            robot_selection: 0,
            sensor_selection: 0,
            delivery_selection: 0,
            user_selection: 0,
            robots: Vec::new(),
            alerts: Vec::new(),
            deliveries: Vec::new(),
            users: Vec::new(),
            recent_readings: HashMap::new(),
            refresh_rx: rx,
            refresh_tx: tx,
            status_message: None,
            cache_ages: CacheAges::default(),
        }
    }
}
