// ============================================================================
// tlapse-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Interaction with the ffmpeg encoder
//
// This module owns everything that crosses the process boundary: building the
// encoder's argument list and spawning it with a readable progress channel.
// The spawning side is expressed as traits so the run orchestrator can be
// driven by a synthetic encoder in tests.
//
// KEY COMPONENTS:
// - EncoderInvocation / build_encoder_invocation (command construction)
// - EncoderSpawner / EncoderProcess traits and the std::process implementation

// ============================================================================
// SUBMODULES
// ============================================================================

/// Contains ffmpeg argument construction
pub mod command;

/// Contains traits and implementations for running the encoder
pub mod process;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use command::{EncoderInvocation, build_encoder_invocation, requires_pixel_format};
pub use process::{ChildProcess, EncoderExit, EncoderProcess, EncoderSpawner, ProcessSpawner};
