use std::io;

use anyhow::Result;
use chrono::Local;
use clap::{Parser, Subcommand};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use tui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use ti_services::cart::Cart;
use ti_services::client::ApiClient;
use ti_services::config;
use ti_services::logger::init_server_logger;
use ti_services::server::start_server;
use ti_services::ui::{
    cart::{handle_input as handle_cart_input, render_cart, CartAction, CartState},
    components::Notice,
    home::{handle_input as handle_home_input, render_home, HomeAction, HomeEntry, HomeState},
    login::{handle_input as handle_login_input, render_login, LoginAction, LoginState},
    password_wizard::{
        handle_input as handle_password_input, render_password_wizard, PasswordWizardAction, PasswordWizardState,
    },
    registration_wizard::{
        handle_input as handle_registration_input, render_registration_wizard, RegistrationAction,
        RegistrationWizardState,
    },
    service_wizard::{
        handle_input as handle_service_input, render_service_wizard, ServiceWizardAction, ServiceWizardState,
    },
};

#[derive(Parser)]
#[command(name = "ti-services", version, about = "Portal de clientes de serviços de TI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the REST API
    Serve {
        /// Overrides PORT
        #[arg(short, long)]
        port: Option<u16>,

        #[arg(short, long)]
        verbose: bool,
    },
    /// Open the terminal client
    App {
        /// Overrides API_URL
        #[arg(long)]
        api_url: Option<String>,
    },
}

// Represents the current screen in the app
enum AppScreen {
    Home,
    Login,
    Registration,
    PasswordChange,
    ServiceRegistration,
    Cart,
}

// Main application state
struct AppState {
    api: ApiClient,
    screen: AppScreen,
    home_state: HomeState,
    login_state: Option<LoginState>,
    registration_state: Option<RegistrationWizardState>,
    password_state: Option<PasswordWizardState>,
    service_state: Option<ServiceWizardState>,
    cart_state: Option<CartState>,
}

impl AppState {
    fn new(api: ApiClient) -> Self {
        Self {
            api,
            screen: AppScreen::Home,
            home_state: HomeState::new(None),
            login_state: None,
            registration_state: None,
            password_state: None,
            service_state: None,
            cart_state: None,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve { port, verbose } => {
            init_server_logger(verbose);
            let mut config = config::init()?;
            if let Some(port) = port {
                config.port = port;
            }
            start_server(config).await
        }
        Command::App { api_url } => {
            let config = config::init()?;
            let api_url = api_url.unwrap_or(config.api_url);
            run_client(&api_url).await
        }
    }
}

async fn run_client(api_url: &str) -> Result<()> {
    let api = ApiClient::new(api_url)?;

    // Setup terminal
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app_state = AppState::new(api);
    let result = run_app(&mut terminal, &mut app_state).await;

    // Restore terminal
    terminal::disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        println!("Erro: {err:#}");
    }

    Ok(())
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app_state: &mut AppState) -> Result<()> {
    loop {
        terminal.draw(|f| match app_state.screen {
            AppScreen::Home => render_home(f, &mut app_state.home_state),
            AppScreen::Login => {
                if let Some(state) = &mut app_state.login_state {
                    render_login(f, state);
                }
            }
            AppScreen::Registration => {
                if let Some(state) = &mut app_state.registration_state {
                    render_registration_wizard(f, state);
                }
            }
            AppScreen::PasswordChange => {
                if let Some(state) = &mut app_state.password_state {
                    render_password_wizard(f, state);
                }
            }
            AppScreen::ServiceRegistration => {
                if let Some(state) = &mut app_state.service_state {
                    render_service_wizard(f, state);
                }
            }
            AppScreen::Cart => {
                if let Some(state) = &mut app_state.cart_state {
                    render_cart(f, state);
                }
            }
        })?;

        let should_quit = match app_state.screen {
            AppScreen::Home => handle_home_screen(app_state).await?,
            AppScreen::Login => handle_login_screen(app_state).await?,
            AppScreen::Registration => handle_registration_screen(app_state).await?,
            AppScreen::PasswordChange => handle_password_screen(app_state).await?,
            AppScreen::ServiceRegistration => handle_service_screen(app_state).await?,
            AppScreen::Cart => handle_cart_screen(app_state).await?,
        };

        if should_quit {
            break;
        }
    }

    Ok(())
}

fn go_home(app_state: &mut AppState, notice: Option<Notice>) {
    let client = app_state.api.session().map(|session| session.client.clone());
    let mut home = HomeState::new(client);
    home.notice = notice;

    app_state.home_state = home;
    app_state.login_state = None;
    app_state.registration_state = None;
    app_state.password_state = None;
    app_state.service_state = None;
    app_state.cart_state = None;
    app_state.screen = AppScreen::Home;
}

async fn load_cart_screen(app_state: &mut AppState) -> Result<()> {
    let loaded = async {
        let services = app_state.api.list_services().await?;
        let requests = app_state.api.list_requests().await?;
        Ok::<_, ti_services::client::ClientError>((services, requests))
    }
    .await;

    match loaded {
        Ok((services, requests)) => {
            app_state.cart_state = Some(CartState::new(services, Cart::from_requests(requests)));
            app_state.screen = AppScreen::Cart;
        }
        Err(err) => go_home(app_state, Some(Notice::error(err))),
    }

    Ok(())
}

async fn handle_home_screen(app_state: &mut AppState) -> Result<bool> {
    match handle_home_input(&mut app_state.home_state)? {
        Some(HomeAction::Quit) => return Ok(true),
        Some(HomeAction::Open(HomeEntry::Login)) => {
            app_state.login_state = Some(LoginState::new());
            app_state.screen = AppScreen::Login;
        }
        Some(HomeAction::Open(HomeEntry::Register)) => {
            let today = Local::now().date_naive();
            app_state.registration_state = Some(RegistrationWizardState::new(today));
            app_state.screen = AppScreen::Registration;
        }
        Some(HomeAction::Open(HomeEntry::ChangePassword)) => {
            let login = app_state.api.session().map(|session| session.client.login.as_str());
            app_state.password_state = Some(PasswordWizardState::new(login));
            app_state.screen = AppScreen::PasswordChange;
        }
        Some(HomeAction::Open(HomeEntry::ServiceRegistration)) => {
            app_state.service_state = Some(ServiceWizardState::new());
            app_state.screen = AppScreen::ServiceRegistration;
        }
        Some(HomeAction::Open(HomeEntry::Cart)) => load_cart_screen(app_state).await?,
        Some(HomeAction::Open(HomeEntry::Logout)) => {
            let notice = match app_state.api.logout().await {
                Ok(()) => Notice::info("Sessão encerrada."),
                Err(err) => Notice::error(err),
            };
            go_home(app_state, Some(notice));
        }
        Some(HomeAction::Open(HomeEntry::Quit)) => return Ok(true),
        None => {}
    }

    Ok(false)
}

async fn handle_login_screen(app_state: &mut AppState) -> Result<bool> {
    if let Some(state) = &mut app_state.login_state {
        match handle_login_input(state)? {
            Some(LoginAction::Cancel) => go_home(app_state, None),
            Some(LoginAction::Submit(payload)) => {
                let login = payload.login.unwrap_or_default();
                let password = payload.password.unwrap_or_default();
                match app_state.api.login(&login, &password).await {
                    Ok(message) => go_home(app_state, Some(Notice::info(message))),
                    Err(err) => state.notice = Some(Notice::error(err)),
                }
            }
            None => {}
        }
    }

    Ok(false)
}

async fn handle_registration_screen(app_state: &mut AppState) -> Result<bool> {
    if let Some(state) = &mut app_state.registration_state {
        match handle_registration_input(state)? {
            Some(RegistrationAction::Cancel) => go_home(app_state, None),
            Some(RegistrationAction::Submit(payload)) => match app_state.api.register_client(&payload).await {
                Ok(message) => go_home(app_state, Some(Notice::info(message))),
                Err(err) => state.notice = Some(Notice::error(err)),
            },
            None => {}
        }
    }

    Ok(false)
}

async fn handle_password_screen(app_state: &mut AppState) -> Result<bool> {
    if let Some(state) = &mut app_state.password_state {
        match handle_password_input(state)? {
            Some(PasswordWizardAction::Cancel) => go_home(app_state, None),
            Some(PasswordWizardAction::Submit(payload)) => match app_state.api.change_password(&payload).await {
                Ok(message) => {
                    // The server revokes every session of that client
                    let changed_own = app_state
                        .api
                        .session()
                        .is_some_and(|session| Some(&session.client.login) == payload.login.as_ref());
                    if changed_own {
                        app_state.api.forget_session();
                    }
                    go_home(app_state, Some(Notice::info(message)));
                }
                Err(err) => state.notice = Some(Notice::error(err)),
            },
            None => {}
        }
    }

    Ok(false)
}

async fn handle_service_screen(app_state: &mut AppState) -> Result<bool> {
    if let Some(state) = &mut app_state.service_state {
        match handle_service_input(state)? {
            Some(ServiceWizardAction::Cancel) => go_home(app_state, None),
            Some(ServiceWizardAction::Submit(service)) => match app_state.api.create_service(&service).await {
                Ok(id) => state.reset(Notice::info(format!("Serviço cadastrado com sucesso (código {id})."))),
                Err(err) => state.notice = Some(Notice::error(err)),
            },
            None => {}
        }
    }

    Ok(false)
}

async fn handle_cart_screen(app_state: &mut AppState) -> Result<bool> {
    if let Some(state) = &mut app_state.cart_state {
        match handle_cart_input(state)? {
            Some(CartAction::Back) => go_home(app_state, None),
            Some(CartAction::Reload) => load_cart_screen(app_state).await?,
            Some(CartAction::Save(requests)) => match app_state.api.replace_requests(&requests).await {
                Ok(message) => {
                    load_cart_screen(app_state).await?;
                    if let Some(state) = &mut app_state.cart_state {
                        state.notice = Some(Notice::info(message));
                    }
                }
                Err(err) => state.notice = Some(Notice::error(err)),
            },
            None => {}
        }
    }

    Ok(false)
}
