//! Terminal viewer for STL models
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal,
};
use std::io::{self, stdout, Write};
use std::path::Path;
use std::time::Instant;
use stlview_core::{LoadError, Mesh, RotationState, Transform};
use tracing::{debug, info};

pub mod camera;
pub mod config;
pub mod fps;
pub mod renderer;

pub use camera::Camera;
pub use config::ViewerConfig;
pub use fps::FpsCounter;
pub use renderer::{AsciiRenderer, DrawMode};

const INITIAL_ROTATION: (f32, f32, f32) = (0.3, 0.3, 0.0);
const ZOOM_RANGE: (f32, f32) = (0.1, 10.0);

/// Text shown to the user when a model cannot be loaded
pub fn user_message(err: &LoadError, path: &Path) -> String {
    match err {
        LoadError::InvalidStlFile => "STL file is broken".to_string(),
        LoadError::FileNotFound { .. } => format!("File not found: {}", path.display()),
        LoadError::MemAlloc { .. } => "Not enough memory".to_string(),
        other => format!("Application error: {} ({})", other.code(), other),
    }
}

fn initial_rotation() -> RotationState {
    let (x, y, z) = INITIAL_ROTATION;
    RotationState::new(x, y, z)
}

/// Main application struct for terminal rendering
pub struct TerminalApp {
    mesh: Mesh,
    rotation: RotationState,
    zoom: f32,
    camera: Camera,
    renderer: AsciiRenderer,
    config: ViewerConfig,
    draw_mode: DrawMode,
    running: bool,
    spinning: bool,
    fps: FpsCounter,
}

impl TerminalApp {
    pub fn new(mesh: Mesh, config: ViewerConfig) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        Ok(Self::with_size(mesh, config, width, height))
    }

    pub fn with_size(mesh: Mesh, config: ViewerConfig, width: u16, height: u16) -> Self {
        Self {
            mesh,
            rotation: initial_rotation(),
            zoom: 1.0,
            camera: Camera::new(width, height),
            renderer: AsciiRenderer::new(width as usize, height as usize),
            config,
            draw_mode: DrawMode::default(),
            running: true,
            spinning: true,
            fps: FpsCounter::default(),
        }
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn rotation(&self) -> &RotationState {
        &self.rotation
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn draw_mode(&self) -> DrawMode {
        self.draw_mode
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_spinning(&self) -> bool {
        self.spinning
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let frame_time = self.config.frame_time();
        info!(facets = self.mesh.len(), fps = self.config.target_fps, "viewer started");

        while self.running {
            let frame_start = Instant::now();

            while event::poll(std::time::Duration::ZERO)? {
                self.handle_event(event::read()?);
            }

            self.update();
            self.render()?;

            let elapsed = frame_start.elapsed();
            if elapsed < frame_time {
                std::thread::sleep(frame_time - elapsed);
            }
            self.fps.tick(Instant::now());
        }

        info!("viewer stopped");
        Ok(())
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(KeyEvent { code, kind: KeyEventKind::Press | KeyEventKind::Repeat, .. }) => {
                self.handle_key(code)
            }
            Event::Resize(width, height) => self.resize(width, height),
            _ => {}
        }
    }

    pub fn handle_key(&mut self, code: KeyCode) {
        let step = self.config.rotation_step;
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.running = false,
            KeyCode::Char('x') => self.mesh.rotate_x(),
            KeyCode::Char('y') => self.mesh.rotate_y(),
            KeyCode::Char('z') => self.mesh.rotate_z(),
            KeyCode::Char('w') | KeyCode::Up => self.rotation.rotate(step, 0.0, 0.0),
            KeyCode::Char('s') | KeyCode::Down => self.rotation.rotate(-step, 0.0, 0.0),
            KeyCode::Char('a') | KeyCode::Left => self.rotation.rotate(0.0, -step, 0.0),
            KeyCode::Char('d') | KeyCode::Right => self.rotation.rotate(0.0, step, 0.0),
            KeyCode::Char('e') => self.rotation.rotate(0.0, 0.0, step),
            KeyCode::Char('c') => self.rotation.rotate(0.0, 0.0, -step),
            KeyCode::Char('+') | KeyCode::Char('=') => self.zoom_by(self.config.zoom_step),
            KeyCode::Char('-') => self.zoom_by(-self.config.zoom_step),
            KeyCode::Char('r') => {
                self.rotation = initial_rotation();
                self.zoom = 1.0;
            }
            KeyCode::Char(' ') => self.spinning = !self.spinning,
            KeyCode::Tab => {
                self.draw_mode = self.draw_mode.next();
                debug!(mode = self.draw_mode.label(), "draw mode changed");
            }
            _ => {}
        }
    }

    fn zoom_by(&mut self, delta: f32) {
        let (min, max) = ZOOM_RANGE;
        self.zoom = (self.zoom + delta).clamp(min, max);
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        debug!(width, height, "terminal resized");
        self.camera.resize(width, height);
        self.renderer.resize(width as usize, height as usize);
    }

    fn update(&mut self) {
        if self.spinning {
            let (dx, dy) = self.config.spin;
            self.rotation.rotate(dx, dy, 0.0);
        }
    }

    fn overlay(&self) -> String {
        format!(
            "{} | {} facets | {} | FPS: {:.1} | x/y/z=Turn WASD/Arrows=Rotate E/C=Roll +/-=Zoom R=Reset Space=Spin Tab=Mode Q=Quit",
            self.mesh.name(),
            self.mesh.len(),
            self.draw_mode.label(),
            self.fps.fps()
        )
    }

    fn render(&mut self) -> io::Result<()> {
        let model = Transform::model_matrix(&self.rotation, self.zoom);

        self.renderer.clear();
        self.renderer.render_mesh(&self.mesh, &model, &self.camera, self.draw_mode);

        let mut stdout = stdout();
        self.renderer.draw(&mut stdout)?;

        let overlay: String = self.overlay().chars().take(self.renderer.width()).collect();
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(overlay),
            ResetColor
        )?;

        stdout.flush()
    }
}
