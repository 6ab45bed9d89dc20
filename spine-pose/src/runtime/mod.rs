mod animation;
mod animation_state;
mod bone;
mod ik;
mod path_constraint;
mod skeleton;
mod transform_constraint;

pub use animation::*;
pub use animation_state::*;
pub use bone::*;
pub use ik::*;
pub use path_constraint::*;
pub use skeleton::*;
pub use transform_constraint::*;

#[cfg(test)]
mod test_rig;

#[cfg(test)]
mod bone_tests;

#[cfg(test)]
mod skeleton_tests;


#[cfg(test)]
mod deform_tests;


#[cfg(test)]
mod transform_constraint_tests;

#[cfg(test)]
mod path_constraint_tests;


#[cfg(test)]
mod animation_state_mixing_tests;
