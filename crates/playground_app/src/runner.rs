use playground_core::{
    CancellationToken, ContextHost, FrameLoop, LoopError, LoopOptions, LoopStats, Scenario,
};
use playground_renderer::ShaderProgram;

use crate::builder::AppConfig;
use crate::error::InitError;
use crate::graphics::GraphicsState;
use crate::host::WinitHost;

pub const EXIT_OK: i32 = 0;
pub const EXIT_INIT_FAILURE: i32 = -1;
/// The loop stopped on a driver error under `ErrorPolicy::Strict`.
pub const EXIT_DRIVER_FAILURE: i32 = 1;

/// Everything the loop needs, in teardown order: GPU objects before the
/// window they present to.
struct Session {
    frame_loop: FrameLoop,
    graphics: GraphicsState,
    host: WinitHost,
}

pub(crate) fn run_internal(config: &AppConfig, token: CancellationToken) -> i32 {
    let mut session = match bootstrap(config, token) {
        Ok(session) => session,
        Err(e) => {
            // not through `log`: the logger may be off or missing
            eprintln!("playground: initialization failed: {e}");
            return EXIT_INIT_FAILURE;
        }
    };

    let result = session
        .frame_loop
        .run(&mut session.graphics, &mut session.host);

    let leaked = session.graphics.renderer.live_buffers();
    if leaked > 0 {
        log::warn!("{leaked} GPU buffers still live after shutdown");
    }
    match &result {
        Ok(stats) => log_summary(stats, session.host.elapsed()),
        Err(e) => log::error!("render loop stopped: {e}"),
    }
    drop(session);
    exit_code(&result)
}

fn bootstrap(config: &AppConfig, token: CancellationToken) -> Result<Session, InitError> {
    let window = &config.window;
    let mut scenario = Scenario::builtin(&config.run.scenario)?;

    let host = WinitHost::new(window)?;
    let size = host.window().inner_size();
    scenario.camera = scenario.camera.with_surface_size(size.width, size.height);

    let mut graphics = pollster::block_on(GraphicsState::new(
        host.window().clone(),
        window,
        host.resize_signal(),
    ))?;

    let program = ShaderProgram::load(&graphics.renderer.context.device, &scenario.shader)?;
    for name in ["MVP", "M", "V", "LightPosition_worldspace"] {
        match program.uniform_location(name) {
            Some(offset) => log::debug!("uniform {name} at offset {offset}"),
            None => log::debug!("uniform {name} unused by this program"),
        }
    }
    graphics.renderer.use_program(program);

    let options = LoopOptions {
        angular_velocity: config.run.angular_velocity,
        upload: config.run.upload,
        errors: config.run.errors,
    };
    let frame_loop = FrameLoop::new(scenario, options)?.with_token(token);

    Ok(Session {
        frame_loop,
        graphics,
        host,
    })
}

fn log_summary(stats: &LoopStats, elapsed: f64) {
    let fps = if elapsed > 0.0 {
        stats.frames as f64 / elapsed
    } else {
        0.0
    };
    log::info!("{} frames in {elapsed:.2}s ({fps:.1} fps average)", stats.frames);
}

pub fn exit_code(result: &Result<LoopStats, LoopError>) -> i32 {
    match result {
        Ok(_) => EXIT_OK,
        Err(_) => EXIT_DRIVER_FAILURE,
    }
}
