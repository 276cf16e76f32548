/// Terminal wireframe viewer driving the objview core
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use nalgebra::Matrix4;
use objview_core::{Camera, Mesh, ProjectionMode, Transform};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};

pub mod config;
pub mod renderer;

pub use config::ViewerConfig;
pub use renderer::AsciiRenderer;

/// A discrete edit issued by one key press
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Move(f64, f64, f64),
    Scale(f64),
    Rotate(f64, f64, f64),
    ToggleProjection,
    Reload,
    Quit,
}

impl Command {
    /// Map a key to its command using the step sizes in `config`
    pub fn from_key(code: KeyCode, config: &ViewerConfig) -> Option<Self> {
        let step = config.move_step;
        let angle = config.rotate_step;
        let command = match code {
            KeyCode::Char('q') | KeyCode::Esc => Self::Quit,
            KeyCode::Char('w') | KeyCode::Up => Self::Move(0.0, step, 0.0),
            KeyCode::Char('s') | KeyCode::Down => Self::Move(0.0, -step, 0.0),
            KeyCode::Char('a') | KeyCode::Left => Self::Move(-step, 0.0, 0.0),
            KeyCode::Char('d') | KeyCode::Right => Self::Move(step, 0.0, 0.0),
            KeyCode::Char('f') => Self::Move(0.0, 0.0, step),
            KeyCode::Char('b') => Self::Move(0.0, 0.0, -step),
            KeyCode::Char('+') | KeyCode::Char('=') => Self::Scale(1.0 + config.scale_step),
            KeyCode::Char('-') => Self::Scale(1.0 - config.scale_step),
            KeyCode::Char('x') => Self::Rotate(angle, 0.0, 0.0),
            KeyCode::Char('X') => Self::Rotate(-angle, 0.0, 0.0),
            KeyCode::Char('y') => Self::Rotate(0.0, angle, 0.0),
            KeyCode::Char('Y') => Self::Rotate(0.0, -angle, 0.0),
            KeyCode::Char('z') => Self::Rotate(0.0, 0.0, angle),
            KeyCode::Char('Z') => Self::Rotate(0.0, 0.0, -angle),
            KeyCode::Char('p') => Self::ToggleProjection,
            KeyCode::Char('o') => Self::Reload,
            _ => return None,
        };
        Some(command)
    }
}

/// Main application struct for terminal wireframe viewing
pub struct TerminalApp {
    mesh: Mesh,
    config: ViewerConfig,
    camera: Camera,
    renderer: AsciiRenderer,
    status: String,
    running: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(mesh: Mesh, config: ViewerConfig) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        Ok(Self::with_size(mesh, config, width as usize, height as usize))
    }

    /// Build the app for a fixed-size viewport without touching the terminal
    pub fn with_size(mut mesh: Mesh, config: ViewerConfig, width: usize, height: usize) -> Self {
        // Rotations turn the model about its middle
        Transform::center(&mut mesh);

        // The top row is the status line
        let rows = height.saturating_sub(1);
        let mut camera = Camera::new(width as u32, rows as u32);
        if config.orthographic {
            camera.mode = ProjectionMode::Orthographic;
        }

        Self {
            mesh,
            config,
            camera,
            renderer: AsciiRenderer::new(width, rows),
            status: String::new(),
            running: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        }
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn is_running(&self) -> bool {
        self.running
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
        let target_frame_time = self.config.frame_time();

        while self.running {
            let frame_start = Instant::now();

            // Handle input
            if event::poll(Duration::from_millis(0))? {
                self.handle_event(event::read()?);
            }

            // Render
            self.render()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(KeyEvent {
                code,
                kind: KeyEventKind::Press,
                ..
            }) => {
                if let Some(command) = Command::from_key(code, &self.config) {
                    self.apply(command);
                }
            }
            Event::Resize(width, height) => {
                let rows = height.saturating_sub(1);
                self.renderer.resize(width as usize, rows as usize);
                self.camera.aspect = f64::from(width) / f64::from(rows.max(1));
            }
            _ => {}
        }
    }

    /// Apply one command to the mesh or the view
    pub fn apply(&mut self, command: Command) {
        log::debug!("applying {:?}", command);
        match command {
            Command::Move(dx, dy, dz) => Transform::translate(&mut self.mesh, dx, dy, dz),
            Command::Scale(factor) => Transform::scale(&mut self.mesh, factor),
            Command::Rotate(ax, ay, az) => Transform::rotate(&mut self.mesh, ax, ay, az),
            Command::ToggleProjection => self.camera.toggle_mode(),
            Command::Reload => self.reload(),
            Command::Quit => self.running = false,
        }
    }

    /// Replace the mesh with a fresh load of the source file. On failure the
    /// current mesh stays and the error goes to the status line.
    pub fn reload(&mut self) {
        let Some(path) = self.config.path.clone() else {
            self.status = "nothing to reload".to_string();
            return;
        };

        match objview_core::load_with(&path, &self.config.load_options()) {
            Ok(mut mesh) => {
                Transform::center(&mut mesh);
                self.mesh = mesh;
                self.status = "reloaded".to_string();
            }
            Err(err) => {
                log::error!("reload of {} failed: {}", path.display(), err);
                self.status = format!("reload failed: {}", err);
            }
        }
    }

    fn title(&self) -> String {
        let name = self
            .config
            .path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "cube".to_string());
        let mode = match self.camera.mode {
            ProjectionMode::Perspective => "persp",
            ProjectionMode::Orthographic => "ortho",
        };
        format!(
            "objview | {} | {} vertices, {} edges | {} | FPS: {:.1} | {}",
            name,
            self.mesh.vertex_count(),
            self.mesh.edge_count(),
            mode,
            self.fps,
            self.status
        )
    }

    fn render(&mut self) -> io::Result<()> {
        // Transforms are baked into the mesh
        let model = Matrix4::identity();

        // Clear renderer
        self.renderer.clear();

        // Render mesh
        self.renderer.render_mesh(&self.mesh, &model, &self.camera);

        // Output to terminal
        let mut stdout = stdout();
        let title: String = self.title().chars().take(self.renderer.width()).collect();
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            terminal::Clear(terminal::ClearType::CurrentLine),
            SetForegroundColor(Color::Yellow),
            Print(title),
            ResetColor,
            cursor::MoveTo(0, 1)
        )?;

        self.renderer.draw(&mut stdout)?;

        stdout.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app(config: ViewerConfig) -> TerminalApp {
        TerminalApp::with_size(Mesh::cube(), config, 80, 25)
    }

    #[test]
    fn test_key_mapping() {
        let config = ViewerConfig::default();
        assert_eq!(Command::from_key(KeyCode::Up, &config), Some(Command::Move(0.0, 0.1, 0.0)));
        match Command::from_key(KeyCode::Char('+'), &config) {
            Some(Command::Scale(factor)) => assert!((factor - 1.1).abs() < 1e-12),
            other => panic!("unexpected {other:?}"),
        }
        match Command::from_key(KeyCode::Char('-'), &config) {
            Some(Command::Scale(factor)) => assert!((factor - 0.9).abs() < 1e-12),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(
            Command::from_key(KeyCode::Char('Y'), &config),
            Some(Command::Rotate(0.0, -10.0, 0.0))
        );
        assert_eq!(Command::from_key(KeyCode::Esc, &config), Some(Command::Quit));
        assert_eq!(Command::from_key(KeyCode::Char('k'), &config), None);
    }

    #[test]
    fn test_mesh_is_centered() {
        let app = app(ViewerConfig::default());
        let bounds = app.mesh().bounds().unwrap();
        assert!((bounds.center().coords.norm()) < 1e-12);
    }

    #[test]
    fn test_commands_edit_mesh() {
        let mut app = app(ViewerConfig::default());
        let before = app.mesh().vertex(0).unwrap();

        app.apply(Command::Move(1.0, 0.0, 0.0));
        assert!((app.mesh().vertex(0).unwrap().x - (before.x + 1.0)).abs() < 1e-12);

        app.apply(Command::Scale(2.0));
        assert!((app.mesh().vertex(0).unwrap().y - before.y * 2.0).abs() < 1e-12);

        app.apply(Command::ToggleProjection);
        assert_eq!(app.camera().mode, ProjectionMode::Orthographic);

        app.apply(Command::Quit);
        assert!(!app.is_running());
    }

    #[test]
    fn test_reload_failure_keeps_mesh() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "v 0 0 0\nv 2 0 0\nl 1 2").unwrap();
        let config = ViewerConfig {
            path: Some(file.path().to_path_buf()),
            strict: true,
            ..ViewerConfig::default()
        };
        let mesh = objview_core::load_with(file.path(), &config.load_options()).unwrap();
        let mut app = TerminalApp::with_size(mesh, config, 80, 25);
        assert_eq!(app.mesh().edge_count(), 1);

        writeln!(file, "l 1 5").unwrap();
        app.apply(Command::Reload);
        assert!(app.status().starts_with("reload failed"));
        assert_eq!(app.mesh().edge_count(), 1);
    }

    #[test]
    fn test_reload_without_file() {
        let mut app = app(ViewerConfig::default());
        app.reload();
        assert_eq!(app.status(), "nothing to reload");
        assert_eq!(app.mesh().vertex_count(), 8);
    }
}
