use super::{Component, Node};
use crate::error::StateError;
use crate::runtime::Runtime;
use crate::signal::{Memo, Signal};

/// Dog years per human year.
pub const DOG_YEARS_PER_YEAR: u64 = 7;

/// Primary state of a profile view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileState {
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
}

impl ProfileState {
    /// Build a state record, rejecting ages that are negative or too large.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        age: i64,
    ) -> Result<Self, StateError> {
        Ok(Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            age: validate_age(age)?,
        })
    }
}

/// Values computed from a [`ProfileState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedProfile {
    pub full_name: String,
    pub age_in_dog_years: u64,
}

impl DerivedProfile {
    pub fn derive(state: &ProfileState) -> Self {
        Self {
            full_name: format!("{} {}", state.first_name, state.last_name),
            age_in_dog_years: u64::from(state.age) * DOG_YEARS_PER_YEAR,
        }
    }
}

pub(crate) fn validate_age(age: i64) -> Result<u32, StateError> {
    u32::try_from(age).map_err(|_| {
        let reason = if age < 0 {
            format!("must be non-negative, got {age}")
        } else {
            format!("must be at most {}, got {age}", u32::MAX)
        };
        StateError::invalid("age", reason)
    })
}

/// A view showing a person's full name and age in dog years.
///
/// Each field is its own signal; the derived profile is a memo over all
/// three, so it is recomputed on the first read after any field changes and
/// never goes stale.
///
/// ```
/// use stateview::{ProfileState, ProfileView};
///
/// let view = ProfileView::with_state(ProfileState::new("Ada", "Lovelace", 3)?);
/// let profile = view.get_profile();
/// assert_eq!(profile.full_name, "Ada Lovelace");
/// assert_eq!(profile.age_in_dog_years, 21);
/// # Ok::<(), stateview::StateError>(())
/// ```
pub struct ProfileView {
    runtime: Runtime,
    first_name: Signal<String>,
    last_name: Signal<String>,
    age: Signal<u32>,
    profile: Memo<DerivedProfile>,
}

impl ProfileView {
    /// An empty profile: blank names, age 0.
    pub fn new() -> Self {
        Self::with_state(ProfileState::default())
    }

    pub fn with_state(state: ProfileState) -> Self {
        let runtime = Runtime::new();
        let first_name = runtime.signal(state.first_name);
        let last_name = runtime.signal(state.last_name);
        let age = runtime.signal(state.age);

        let profile = runtime.memo({
            let first_name = first_name.clone();
            let last_name = last_name.clone();
            let age = age.clone();
            move || {
                DerivedProfile::derive(&ProfileState {
                    first_name: first_name.get(),
                    last_name: last_name.get(),
                    age: age.get(),
                })
            }
        });

        Self {
            runtime,
            first_name,
            last_name,
            age,
            profile,
        }
    }

    pub fn get_profile(&self) -> DerivedProfile {
        self.profile.get()
    }

    pub fn set_first_name(&self, name: impl Into<String>) {
        let name = name.into();
        log::debug!("profile first name -> {name:?}");
        self.first_name.set(name);
    }

    pub fn set_last_name(&self, name: impl Into<String>) {
        let name = name.into();
        log::debug!("profile last name -> {name:?}");
        self.last_name.set(name);
    }

    /// Set the age. Negative ages are rejected and leave the state as it was.
    pub fn set_age(&self, age: i64) -> Result<(), StateError> {
        let age = validate_age(age).inspect_err(|err| {
            log::warn!("rejected profile update: {err}");
        })?;
        log::debug!("profile age -> {age}");
        self.age.set(age);
        Ok(())
    }
}

impl Default for ProfileView {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for ProfileView {
    type State = ProfileState;

    fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    fn state(&self) -> ProfileState {
        ProfileState {
            first_name: self.first_name.get_untracked(),
            last_name: self.last_name.get_untracked(),
            age: self.age.get_untracked(),
        }
    }

    fn render(&self) -> Node {
        let profile = self.get_profile();
        Node::element(
            "div",
            [
                Node::element("h2", [Node::text(profile.full_name)]),
                Node::element(
                    "h3",
                    [Node::text(format!("Age: {}", profile.age_in_dog_years))],
                ),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ada_lovelace() {
        let view = ProfileView::new();
        view.set_first_name("Ada");
        view.set_last_name("Lovelace");
        view.set_age(3).unwrap();

        let profile = view.get_profile();
        assert_eq!(profile.full_name, "Ada Lovelace");
        assert_eq!(profile.age_in_dog_years, 21);
    }

    #[test]
    fn empty_profile() {
        let profile = ProfileView::default().get_profile();
        assert_eq!(profile.full_name, " ");
        assert_eq!(profile.age_in_dog_years, 0);
    }

    #[test]
    fn full_name_joins_with_a_single_space() {
        let view = ProfileView::new();
        let names = [
            ("Grace", "Hopper"),
            ("", "Turing"),
            ("Alan", ""),
            ("Jean Luc", "Picard"),
        ];
        for (first, last) in names {
            view.set_first_name(first);
            view.set_last_name(last);
            assert_eq!(view.get_profile().full_name, format!("{first} {last}"));
        }
    }

    #[test]
    fn dog_years_for_all_sampled_ages() {
        let view = ProfileView::new();
        for age in [0i64, 1, 2, 10, 99, 1_000, i64::from(u32::MAX)] {
            view.set_age(age).unwrap();
            assert_eq!(view.get_profile().age_in_dog_years, age as u64 * 7);
        }
    }

    #[test]
    fn negative_age_is_rejected_and_state_kept() {
        let view = ProfileView::with_state(ProfileState::new("Ada", "Lovelace", 3).unwrap());
        let before = view.state();

        let err = view.set_age(-1).unwrap_err();
        assert!(matches!(err, StateError::InvalidInput { field: "age", .. }));
        assert_eq!(view.state(), before);
        assert_eq!(view.get_profile().age_in_dog_years, 21);

        assert!(view.set_age(i64::from(u32::MAX) + 1).is_err());
        assert_eq!(view.state(), before);
    }

    #[test]
    fn state_constructor_validates_age() {
        assert!(ProfileState::new("a", "b", -5).is_err());
        assert_eq!(ProfileState::new("a", "b", 5).unwrap().age, 5);
    }

    #[test]
    fn render_matches_derived_values() {
        let view = ProfileView::with_state(ProfileState::new("Ada", "Lovelace", 3).unwrap());
        assert_eq!(
            view.render().to_html(),
            "<div><h2>Ada Lovelace</h2><h3>Age: 21</h3></div>"
        );
    }
}
