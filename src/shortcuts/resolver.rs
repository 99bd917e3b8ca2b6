//! Chord lookup with site/global conflict resolution

use crate::keys::Chord;
use crate::settings::ConflictMode;

use super::map::{Scope, Shortcut, ShortcutMap};

/// Outcome of looking up a chord for a tab URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// No shortcut is bound to the chord
    Unbound,
    /// The chord is bound only to site shortcuts that don't match the URL
    Dropped,
    /// This shortcut should fire
    Fire(&'a Shortcut),
}

/// Resolve `chord` against the mapping for a tab at `url`
pub fn resolve<'a>(
    map: &'a ShortcutMap,
    chord: &Chord,
    url: &str,
    mode: ConflictMode,
) -> Resolution<'a> {
    let Some(bindings) = map.get(chord) else {
        return Resolution::Unbound;
    };

    let site_match = bindings.sites.iter().find(|shortcut| match &shortcut.scope {
        Scope::Site(pattern) => pattern.matches(url),
        Scope::Global => false,
    });
    if let Some(shortcut) = site_match {
        return Resolution::Fire(shortcut);
    }

    match (&bindings.global, bindings.sites.is_empty(), mode) {
        (Some(global), true, _) => Resolution::Fire(global),
        (Some(global), false, ConflictMode::GlobalFirst) => Resolution::Fire(global),
        _ => Resolution::Dropped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::ActionId;

    fn chord(s: &str) -> Chord {
        Chord::parse(s).unwrap()
    }

    fn mixed_map() -> ShortcutMap {
        let mut map = ShortcutMap::new();
        map.insert(Shortcut::global(chord("ctrl+shift+k"), ActionId::NewTab));
        map.insert(
            Shortcut::site(chord("ctrl+shift+k"), ActionId::PlayPause, "*.example.com").unwrap(),
        );
        map
    }

    #[test]
    fn test_unbound() {
        let map = mixed_map();
        assert_eq!(
            resolve(&map, &chord("ctrl+j"), "https://a.example.com", ConflictMode::SiteFirst),
            Resolution::Unbound
        );
    }

    #[test]
    fn test_site_match_fires_site_shortcut() {
        let map = mixed_map();
        for mode in [ConflictMode::SiteFirst, ConflictMode::GlobalFirst] {
            match resolve(&map, &chord("ctrl+shift+k"), "https://mail.example.com/inbox", mode) {
                Resolution::Fire(s) => assert_eq!(s.action, ActionId::PlayPause),
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn test_global_first_falls_back_to_global() {
        let map = mixed_map();
        let url = "https://example.org";
        match resolve(&map, &chord("ctrl+shift+k"), url, ConflictMode::GlobalFirst) {
            Resolution::Fire(s) => assert_eq!(s.action, ActionId::NewTab),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_site_first_drops_when_no_site_matches() {
        let map = mixed_map();
        assert_eq!(
            resolve(&map, &chord("ctrl+shift+k"), "https://example.org", ConflictMode::SiteFirst),
            Resolution::Dropped
        );
    }

    #[test]
    fn test_site_only_chord_dropped_in_both_modes() {
        let mut map = ShortcutMap::new();
        map.insert(Shortcut::site(chord("alt+p"), ActionId::PlayPause, "*.youtube.com").unwrap());
        for mode in [ConflictMode::SiteFirst, ConflictMode::GlobalFirst] {
            assert_eq!(
                resolve(&map, &chord("alt+p"), "https://example.org", mode),
                Resolution::Dropped
            );
        }
    }

    #[test]
    fn test_global_only_fires_everywhere() {
        let mut map = ShortcutMap::new();
        map.insert(Shortcut::global(chord("alt+t"), ActionId::NewTab));
        for mode in [ConflictMode::SiteFirst, ConflictMode::GlobalFirst] {
            assert!(matches!(
                resolve(&map, &chord("alt+t"), "chrome://newtab", mode),
                Resolution::Fire(_)
            ));
        }
    }
}
