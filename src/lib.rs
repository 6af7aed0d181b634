//=========================================================================
// Stagehand — Library Root
//
// Event-driven character runtime: characters on a 2-D stage react to
// start, keyboard, mouse, collision and hardware events, and every
// reaction runs as a cooperative task that may span many frames.
//
// Responsibilities:
// - Expose the stage model (`core`) and the windowed `Engine`
// - Keep the winit integration (`platform`) private
//
// Typical usage:
// ```no_run
// use stagehand::prelude::*;
//
// fn main() -> anyhow::Result<()> {
//     EngineBuilder::new()
//         .build()
//         .init(|stage| {
//             let car = stage.create_character(CharacterOptions::new().costume("car1.png"))?;
//             car.on(Trigger::KeyDown(vec![KeyCode::ArrowRight]), |ctx, _| {
//                 ctx.character().move_by(5.0);
//                 Ok(())
//             });
//             Ok(())
//         })?
//         .run();
//     Ok(())
// }
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` holds the stage, characters, events, scheduler and collaborator
// traits. It runs without a window and is what tests drive directly.
//
pub mod core;
pub mod prelude;

//--- Internal Modules ----------------------------------------------------
//
// `platform` owns the OS window and input polling; `engine` wires it to
// the logic thread.
//
mod engine;
mod platform;

//--- Public Exports ------------------------------------------------------

pub use engine::{Engine, EngineBuilder};
