use std::sync::Arc;

use crate::adapters::exec_process::ProcessRunner;
use crate::app::convert_interactor::ConvertInteractor;
use crate::config_initialization::RunConfig;
use crate::engine::Toolchain;
use crate::error::Mkv2Ac3Result;
use crate::ports::ToolRunner;

pub trait AppContainer: Send + Sync {
    fn convert_interactor(&self) -> Arc<ConvertInteractor>;
}

pub struct DefaultAppContainer {
    convert_interactor: Arc<ConvertInteractor>,
}

impl DefaultAppContainer {
    /// Resolve the toolchain and wire the subprocess runner.
    ///
    /// Fails with `ToolNotFound` before any file is touched.
    pub fn new(config: Arc<RunConfig>) -> Mkv2Ac3Result<Self> {
        let toolchain = Toolchain::locate(config.mkvtoolnix_path.as_deref(), config.ffmpeg_path.as_deref())?;
        let runner = Arc::new(ProcessRunner::new(config.mode));

        let convert_interactor = Arc::new(ConvertInteractor::new(
            Arc::clone(&runner) as Arc<dyn ToolRunner>,
            toolchain,
            config,
        ));

        Ok(Self { convert_interactor })
    }
}

impl AppContainer for DefaultAppContainer {
    fn convert_interactor(&self) -> Arc<ConvertInteractor> {
        Arc::clone(&self.convert_interactor)
    }
}
