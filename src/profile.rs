//! Control-profile store and management
//!
//! A profile is a named bundle of control-layout settings. Profiles live in
//! two TOML stores: a read-only builtin store shipped with the app and a
//! user store for edits. Domain-specific behavior (store paths, default
//! handling, which editor opens a profile) is supplied by a capability
//! trait so each profile domain composes with the same manager instead of
//! subclassing it.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::constants::config;
use crate::prefs::UserPrefs;

/// A named bundle of string key/value settings. Identity is the name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub name: String,
    pub settings: BTreeMap<String, String>,
}

impl Profile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            settings: BTreeMap::new(),
        }
    }
}

/// TOML-backed profile collection: one `[profiles.<name>]` table each.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileStore {
    #[serde(default)]
    profiles: BTreeMap<String, BTreeMap<String, String>>,
}

impl ProfileStore {
    /// Load a store, treating a missing file as empty.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read profile store {:?}", path))?;
        Self::parse(&contents).with_context(|| format!("Failed to parse profile store {:?}", path))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create profile directory {:?}", parent))?;
        }
        let toml_string =
            toml::to_string_pretty(self).context("Failed to serialize profile store")?;
        fs::write(path, toml_string)
            .with_context(|| format!("Failed to write profile store {:?}", path))?;
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Profile> {
        self.profiles.get(name).map(|settings| Profile {
            name: name.to_string(),
            settings: settings.clone(),
        })
    }

    pub fn put(&mut self, profile: Profile) {
        self.profiles.insert(profile.name, profile.settings);
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.profiles.remove(name).is_some()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.profiles.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }
}

/// Which editor screen a profile opens in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorScreen {
    TouchscreenLayout,
}

/// Navigation to a profile editor, expressed as data: the screen plus the
/// profile name as its sole parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorRequest {
    pub screen: EditorScreen,
    pub profile_name: String,
}

/// Domain-specific parameters for profile management.
///
/// One implementation per profile domain; the manager composes with it
/// rather than being subclassed.
pub trait ProfileDomain {
    /// Path of the builtin (read-only) or user (editable) store.
    fn config_path(&self, builtin: bool) -> PathBuf;

    /// The default-profile value meaning "no default selected" for this
    /// domain.
    fn no_default_sentinel(&self) -> &str;

    /// Read the persisted default-profile name.
    fn default_profile(&self, prefs: &UserPrefs) -> String;

    /// Write the persisted default-profile name.
    fn set_default_profile(&self, prefs: &mut UserPrefs, name: &str);

    /// Navigation to this domain's profile editor.
    fn edit_request(&self, profile: &Profile) -> EditorRequest;
}

/// The touchscreen control-layout profile domain.
pub struct TouchscreenProfiles {
    pub builtin_dir: PathBuf,
    pub user_dir: PathBuf,
}

impl TouchscreenProfiles {
    /// Platform-default store locations: builtin profiles under the data
    /// dir, user profiles under the config dir.
    pub fn new() -> Self {
        let builtin_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(config::APP_DIR);
        let user_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(config::APP_DIR);
        Self {
            builtin_dir,
            user_dir,
        }
    }

    pub fn with_dirs(builtin_dir: PathBuf, user_dir: PathBuf) -> Self {
        Self {
            builtin_dir,
            user_dir,
        }
    }
}

impl Default for TouchscreenProfiles {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfileDomain for TouchscreenProfiles {
    fn config_path(&self, builtin: bool) -> PathBuf {
        let dir = if builtin {
            &self.builtin_dir
        } else {
            &self.user_dir
        };
        dir.join(config::TOUCHSCREEN_PROFILES)
    }

    fn no_default_sentinel(&self) -> &str {
        ""
    }

    fn default_profile(&self, prefs: &UserPrefs) -> String {
        prefs.touchscreen_default_profile.clone()
    }

    fn set_default_profile(&self, prefs: &mut UserPrefs, name: &str) {
        prefs.touchscreen_default_profile = name.to_string();
    }

    fn edit_request(&self, profile: &Profile) -> EditorRequest {
        EditorRequest {
            screen: EditorScreen::TouchscreenLayout,
            profile_name: profile.name.clone(),
        }
    }
}

/// Profile listing and CRUD over a builtin/user store pair, parameterized by
/// a [`ProfileDomain`].
pub struct ProfileManager<D> {
    domain: D,
    builtin: ProfileStore,
    user: ProfileStore,
}

impl<D: ProfileDomain> ProfileManager<D> {
    /// Load both stores from the domain's paths.
    pub fn open(domain: D) -> Result<Self> {
        let builtin = ProfileStore::load(&domain.config_path(true))?;
        let user = ProfileStore::load(&domain.config_path(false))?;
        Ok(Self::from_parts(domain, builtin, user))
    }

    pub fn from_parts(domain: D, builtin: ProfileStore, user: ProfileStore) -> Self {
        Self {
            domain,
            builtin,
            user,
        }
    }

    pub fn domain(&self) -> &D {
        &self.domain
    }

    /// All profiles, sorted by name. A user profile shadows a builtin one
    /// with the same name.
    pub fn list(&self) -> Vec<Profile> {
        let mut names: Vec<&str> = self.builtin.names().chain(self.user.names()).collect();
        names.sort_unstable();
        names.dedup();
        names
            .into_iter()
            .filter_map(|name| self.get(name))
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<Profile> {
        self.user.get(name).or_else(|| self.builtin.get(name))
    }

    /// True when the profile only exists in the read-only builtin store.
    pub fn is_builtin(&self, name: &str) -> bool {
        self.builtin.contains(name) && !self.user.contains(name)
    }

    /// Create an empty user profile. The name must be unused in both stores.
    pub fn add(&mut self, name: &str) -> Result<()> {
        if name.is_empty() {
            bail!("Profile name must not be empty");
        }
        if self.get(name).is_some() {
            bail!("Profile '{name}' already exists");
        }
        self.user.put(Profile::new(name));
        info!("Created profile '{name}'");
        Ok(())
    }

    /// Copy an existing profile (builtin or user) to a new user profile.
    pub fn duplicate(&mut self, source: &str, dest: &str) -> Result<()> {
        let Some(mut profile) = self.get(source) else {
            bail!("No such profile '{source}'");
        };
        if dest.is_empty() {
            bail!("Profile name must not be empty");
        }
        if self.get(dest).is_some() {
            bail!("Profile '{dest}' already exists");
        }
        profile.name = dest.to_string();
        self.user.put(profile);
        info!("Duplicated profile '{source}' as '{dest}'");
        Ok(())
    }

    /// Delete a user profile. Builtin profiles are read-only. If the deleted
    /// profile was the domain default, the default resets to the sentinel.
    pub fn remove(&mut self, name: &str, prefs: &mut UserPrefs) -> Result<()> {
        if !self.user.contains(name) {
            if self.builtin.contains(name) {
                bail!("Profile '{name}' is builtin and cannot be deleted");
            }
            bail!("No such profile '{name}'");
        }
        self.user.remove(name);
        if self.domain.default_profile(prefs) == name {
            let sentinel = self.domain.no_default_sentinel().to_string();
            self.domain.set_default_profile(prefs, &sentinel);
            info!("Deleted default profile '{name}', default cleared");
        } else {
            info!("Deleted profile '{name}'");
        }
        Ok(())
    }

    pub fn default_profile(&self, prefs: &UserPrefs) -> String {
        self.domain.default_profile(prefs)
    }

    /// Set the domain default to an existing profile, or to the sentinel
    /// when `name` is `None`.
    pub fn set_default(&self, prefs: &mut UserPrefs, name: Option<&str>) -> Result<()> {
        match name {
            Some(name) => {
                if self.get(name).is_none() {
                    bail!("No such profile '{name}'");
                }
                self.domain.set_default_profile(prefs, name);
            }
            None => {
                let sentinel = self.domain.no_default_sentinel().to_string();
                self.domain.set_default_profile(prefs, &sentinel);
            }
        }
        Ok(())
    }

    /// Navigation request for editing a profile.
    pub fn edit(&self, name: &str) -> Result<EditorRequest> {
        let Some(profile) = self.get(name) else {
            bail!("No such profile '{name}'");
        };
        Ok(self.domain.edit_request(&profile))
    }

    /// Persist the user store. The builtin store is never written.
    pub fn save(&self) -> Result<()> {
        self.user.save(&self.domain.config_path(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domain() -> TouchscreenProfiles {
        TouchscreenProfiles::with_dirs(PathBuf::from("/builtin"), PathBuf::from("/user"))
    }

    fn manager() -> ProfileManager<TouchscreenProfiles> {
        let builtin = ProfileStore::parse(
            r#"
            [profiles.Analog]
            touch-layout = "analog"

            [profiles.Digital]
            touch-layout = "digital"
            "#,
        )
        .unwrap();
        let user = ProfileStore::parse(
            r#"
            [profiles.Digital]
            touch-layout = "digital-custom"

            [profiles.Thumbs]
            touch-layout = "thumbs"
            "#,
        )
        .unwrap();
        ProfileManager::from_parts(domain(), builtin, user)
    }

    #[test]
    fn test_store_parse_and_lookup() {
        let store = ProfileStore::parse(
            r#"
            [profiles.Alpha]
            scale = "85"
            "#,
        )
        .unwrap();
        let profile = store.get("Alpha").unwrap();
        assert_eq!(profile.settings.get("scale").unwrap(), "85");
        assert!(store.get("Beta").is_none());
    }

    #[test]
    fn test_store_round_trip() {
        let mut store = ProfileStore::default();
        let mut profile = Profile::new("Custom");
        profile
            .settings
            .insert("opacity".to_string(), "70".to_string());
        store.put(profile);

        let text = toml::to_string_pretty(&store).unwrap();
        let back = ProfileStore::parse(&text).unwrap();
        assert_eq!(back.get("Custom"), store.get("Custom"));
    }

    #[test]
    fn test_list_merges_with_user_precedence() {
        let m = manager();
        let listed = m.list();
        let names: Vec<&str> = listed.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Analog", "Digital", "Thumbs"]);
        // User's Digital shadows the builtin one
        let digital = m.get("Digital").unwrap();
        assert_eq!(digital.settings.get("touch-layout").unwrap(), "digital-custom");
        assert!(m.is_builtin("Analog"));
        assert!(!m.is_builtin("Digital"));
        assert!(!m.is_builtin("Thumbs"));
    }

    #[test]
    fn test_add_rejects_existing_names() {
        let mut m = manager();
        assert!(m.add("Analog").is_err());
        assert!(m.add("Thumbs").is_err());
        assert!(m.add("").is_err());
        m.add("Fresh").unwrap();
        assert!(m.get("Fresh").is_some());
    }

    #[test]
    fn test_duplicate_copies_settings_into_user_store() {
        let mut m = manager();
        m.duplicate("Analog", "Analog Tweaked").unwrap();
        let copy = m.get("Analog Tweaked").unwrap();
        assert_eq!(copy.settings.get("touch-layout").unwrap(), "analog");
        assert!(!m.is_builtin("Analog Tweaked"));
        assert!(m.duplicate("Missing", "X").is_err());
        assert!(m.duplicate("Analog", "Digital").is_err());
    }

    #[test]
    fn test_remove_is_user_store_only() {
        let mut m = manager();
        let mut prefs = UserPrefs::default();
        assert!(m.remove("Analog", &mut prefs).is_err());
        assert!(m.remove("Missing", &mut prefs).is_err());
        m.remove("Thumbs", &mut prefs).unwrap();
        assert!(m.get("Thumbs").is_none());
        // Removing the user override uncovers the builtin profile
        m.remove("Digital", &mut prefs).unwrap();
        let digital = m.get("Digital").unwrap();
        assert_eq!(digital.settings.get("touch-layout").unwrap(), "digital");
    }

    #[test]
    fn test_remove_default_resets_to_sentinel() {
        let mut m = manager();
        let mut prefs = UserPrefs::default();
        m.set_default(&mut prefs, Some("Thumbs")).unwrap();
        assert_eq!(m.default_profile(&prefs), "Thumbs");

        m.remove("Thumbs", &mut prefs).unwrap();
        assert_eq!(m.default_profile(&prefs), "");
        assert_eq!(m.default_profile(&prefs), m.domain().no_default_sentinel());
    }

    #[test]
    fn test_set_default_validates_name() {
        let m = manager();
        let mut prefs = UserPrefs::default();
        assert!(m.set_default(&mut prefs, Some("Missing")).is_err());
        m.set_default(&mut prefs, Some("Analog")).unwrap();
        assert_eq!(m.default_profile(&prefs), "Analog");
        m.set_default(&mut prefs, None).unwrap();
        assert_eq!(m.default_profile(&prefs), "");
    }

    #[test]
    fn test_edit_navigates_with_profile_name() {
        let m = manager();
        let request = m.edit("Analog").unwrap();
        assert_eq!(
            request,
            EditorRequest {
                screen: EditorScreen::TouchscreenLayout,
                profile_name: "Analog".to_string(),
            }
        );
        assert!(m.edit("Missing").is_err());
    }

    #[test]
    fn test_domain_store_paths() {
        let d = domain();
        assert_eq!(
            d.config_path(true),
            PathBuf::from("/builtin/touchscreen-profiles.toml")
        );
        assert_eq!(
            d.config_path(false),
            PathBuf::from("/user/touchscreen-profiles.toml")
        );
    }
}
