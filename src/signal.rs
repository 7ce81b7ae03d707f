//! Signal resolution.
//!
//! A signal table entry is one of three closed variants. Each resolves to a
//! uniform [`AnimatedSignal`]: an ordered list of display states and, unless
//! the object animates itself, a [`StateFunction`] choosing the state from the
//! aspect of the section the signal protects.

use std::fmt::Write;

use crate::route::ObjectHandle;

#[derive(Debug, Clone, PartialEq)]
pub enum SignalData {
    /// A prebuilt animated object that reads the section aspect itself.
    Animated { object: ObjectHandle },
    /// Legacy fixed-aspect signal: one object per listed aspect number.
    Compatibility {
        aspects: Vec<i32>,
        objects: Vec<ObjectHandle>,
    },
    /// Base and glow meshes re-textured per aspect frame.
    ///
    /// Frame `l` shows aspect `l`; either layer may be missing for a frame.
    Textured {
        base: ObjectHandle,
        glow: ObjectHandle,
        base_textures: Vec<Option<String>>,
        glow_textures: Vec<Option<String>>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TexturedLayer {
    pub object: ObjectHandle,
    pub texture: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SignalState {
    Object(ObjectHandle),
    Textured {
        base: Option<TexturedLayer>,
        glow: Option<TexturedLayer>,
    },
}

/// Chooses a state index from a section aspect.
///
/// Branches are tested in order: the first whose threshold is at least the
/// aspect wins, otherwise `fallback` applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateFunction {
    branches: Vec<(i32, usize)>,
    fallback: usize,
}

impl StateFunction {
    pub fn new(branches: Vec<(i32, usize)>, fallback: usize) -> Self {
        Self { branches, fallback }
    }

    pub fn branches(&self) -> &[(i32, usize)] {
        &self.branches
    }

    pub fn evaluate(&self, aspect: i32) -> usize {
        self.branches
            .iter()
            .find(|(threshold, _)| aspect <= *threshold)
            .map(|&(_, state)| state)
            .unwrap_or(self.fallback)
    }

    /// Renders the function as a postfix conditional chain.
    ///
    /// Two aspects 0 and 2 with three states give
    /// `section 0 <= 0 section 2 <= 1 2 ? ?`.
    pub fn to_postfix(&self) -> String {
        let mut expr = String::new();
        for (threshold, state) in &self.branches {
            let _ = write!(expr, "section {} <= {} ", threshold, state);
        }
        let _ = write!(expr, "{}", self.fallback);
        for _ in &self.branches {
            expr.push_str(" ?");
        }
        expr
    }
}

/// A signal ready to be handed to object placement.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimatedSignal {
    pub states: Vec<SignalState>,
    /// `None` when the object carries its own animation.
    pub state_function: Option<StateFunction>,
}

impl SignalData {
    /// Resolves the signal into a drivable object, or `None` when it has no frames.
    pub fn resolve(&self) -> Option<AnimatedSignal> {
        match self {
            SignalData::Animated { object } => Some(AnimatedSignal {
                states: vec![SignalState::Object(*object)],
                state_function: None,
            }),
            SignalData::Compatibility { aspects, objects } => {
                let n = aspects.len().min(objects.len());
                if n == 0 {
                    return None;
                }
                let states = objects[..n].iter().copied().map(SignalState::Object).collect();
                let branches = aspects[..n - 1]
                    .iter()
                    .enumerate()
                    .map(|(state, &aspect)| (aspect, state))
                    .collect();
                Some(AnimatedSignal {
                    states,
                    state_function: Some(StateFunction::new(branches, n - 1)),
                })
            }
            SignalData::Textured {
                base,
                glow,
                base_textures,
                glow_textures,
            } => {
                let frames = base_textures.len().max(glow_textures.len());
                let mut states = Vec::new();
                let mut thresholds = Vec::new();
                for l in 0..frames {
                    let layer = |object: ObjectHandle, textures: &[Option<String>]| {
                        textures.get(l).cloned().flatten().map(|texture| TexturedLayer {
                            object,
                            texture,
                        })
                    };
                    let base = layer(*base, base_textures);
                    let glow = layer(*glow, glow_textures);
                    if base.is_none() && glow.is_none() {
                        continue;
                    }
                    thresholds.push(l as i32);
                    states.push(SignalState::Textured { base, glow });
                }
                let last = states.len().checked_sub(1)?;
                let branches = thresholds[..last]
                    .iter()
                    .enumerate()
                    .map(|(state, &aspect)| (aspect, state))
                    .collect();
                Some(AnimatedSignal {
                    states,
                    state_function: Some(StateFunction::new(branches, last)),
                })
            }
        }
    }

    /// Legacy signals are lit by the ambient brightness like other built-in objects.
    pub fn uses_ambient_brightness(&self) -> bool {
        matches!(self, SignalData::Compatibility { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texture(name: &str) -> Option<String> {
        Some(name.to_string())
    }

    #[test]
    fn animated_signal_passes_through() {
        let resolved = SignalData::Animated {
            object: ObjectHandle(4),
        }
        .resolve()
        .unwrap();
        assert_eq!(resolved.states, vec![SignalState::Object(ObjectHandle(4))]);
        assert!(resolved.state_function.is_none());
    }

    #[test]
    fn compatibility_chain_has_one_branch_per_extra_aspect() {
        let signal = SignalData::Compatibility {
            aspects: vec![0, 2, 4],
            objects: vec![ObjectHandle(1), ObjectHandle(2), ObjectHandle(3)],
        };
        let resolved = signal.resolve().unwrap();
        let function = resolved.state_function.unwrap();

        assert_eq!(resolved.states.len(), 3);
        assert_eq!(function.to_postfix(), "section 0 <= 0 section 2 <= 1 2 ? ?");
        assert_eq!(function.evaluate(0), 0);
        assert_eq!(function.evaluate(1), 1);
        assert_eq!(function.evaluate(2), 1);
        assert_eq!(function.evaluate(5), 2);
        assert!(signal.uses_ambient_brightness());
    }

    #[test]
    fn single_aspect_compatibility_signal_is_constant() {
        let resolved = SignalData::Compatibility {
            aspects: vec![3],
            objects: vec![ObjectHandle(1)],
        }
        .resolve()
        .unwrap();
        let function = resolved.state_function.unwrap();
        assert_eq!(function.to_postfix(), "0");
        assert_eq!(function.evaluate(-4), 0);
    }

    #[test]
    fn empty_compatibility_signal_does_not_resolve() {
        let signal = SignalData::Compatibility {
            aspects: vec![],
            objects: vec![],
        };
        assert!(signal.resolve().is_none());
    }

    #[test]
    fn textured_signal_keeps_frame_order_and_skips_gaps() {
        let signal = SignalData::Textured {
            base: ObjectHandle(10),
            glow: ObjectHandle(11),
            base_textures: vec![texture("r.png"), None, texture("g.png")],
            glow_textures: vec![texture("r_glow.png"), None, None, texture("w_glow.png")],
        };
        let resolved = signal.resolve().unwrap();
        let function = resolved.state_function.unwrap();

        assert_eq!(resolved.states.len(), 3);
        assert_eq!(
            resolved.states[1],
            SignalState::Textured {
                base: Some(TexturedLayer {
                    object: ObjectHandle(10),
                    texture: "g.png".into()
                }),
                glow: None,
            }
        );
        assert_eq!(
            resolved.states[2],
            SignalState::Textured {
                base: None,
                glow: Some(TexturedLayer {
                    object: ObjectHandle(11),
                    texture: "w_glow.png".into()
                }),
            }
        );
        assert_eq!(function.to_postfix(), "section 0 <= 0 section 2 <= 1 2 ? ?");
        assert_eq!(function.evaluate(1), 1);
        assert!(!signal.uses_ambient_brightness());
    }

    #[test]
    fn textured_signal_without_frames_does_not_resolve() {
        let signal = SignalData::Textured {
            base: ObjectHandle(1),
            glow: ObjectHandle(2),
            base_textures: vec![None],
            glow_textures: vec![],
        };
        assert!(signal.resolve().is_none());
    }
}
