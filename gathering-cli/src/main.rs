use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gathering_client::models::{LoginRequest, SignupRequest, UpdateUserRequest, User};
use gathering_client::GatheringClient;
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(short, long)]
    server: Option<String>,

    #[arg(long)]
    session_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new account and start a session with it
    Signup {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },

    /// Log in and remember the account for authored commands
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },

    /// Forget the remembered account
    Logout,

    /// Show the remembered account
    Status,

    /// Update name and/or bio of the remembered account
    Update {
        #[arg(short, long)]
        name: Option<String>,

        #[arg(short, long)]
        bio: Option<String>,
    },

    /// Publish a post as the remembered account
    Create {
        #[arg(short, long)]
        content: String,

        #[arg(long)]
        image: Option<String>,

        #[arg(long)]
        link: Option<String>,
    },

    Get {
        #[arg(short, long)]
        id: i64,
    },

    List,

    Delete {
        #[arg(short, long)]
        id: i64,
    },

    /// Toggle a like on a post as the remembered account
    Like {
        #[arg(short, long)]
        id: i64,
    },

    /// Comment on a post as the remembered account
    Comment {
        #[arg(short, long)]
        post: i64,

        #[arg(short, long)]
        text: String,
    },

    /// Remove a comment from a post
    Uncomment {
        #[arg(short, long)]
        post: i64,

        #[arg(short, long)]
        comment: i64,
    },

    Stats,

    Health,
}

/// The API has no tokens; the "session" is the logged-in user record,
/// kept as JSON the way the web frontend keeps its current user.
struct SessionManager {
    session_path: PathBuf,
}

impl SessionManager {
    fn new(custom_path: Option<PathBuf>) -> Result<Self> {
        let session_path = match custom_path {
            Some(path) => path,
            None => {
                let home = dirs::home_dir().context("Failed to get home directory")?;
                home.join(".gathering_session")
            }
        };

        Ok(Self { session_path })
    }

    fn save_session(&self, user: &User) -> Result<()> {
        let contents = serde_json::to_string_pretty(user)?;
        fs::write(&self.session_path, contents)
            .with_context(|| format!("Failed to save session to {:?}", self.session_path))?;

        println!("✓ Session saved to {:?}", self.session_path);
        Ok(())
    }

    fn load_session(&self) -> Result<Option<User>> {
        match fs::read_to_string(&self.session_path) {
            Ok(contents) => {
                let user: User = serde_json::from_str(&contents)
                    .context("Session file is not a valid user record")?;
                Ok(Some(user))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).context("Failed to read session file"),
        }
    }

    fn clear_session(&self) -> Result<()> {
        if self.session_path.exists() {
            fs::remove_file(&self.session_path)
                .with_context(|| format!("Failed to remove session file {:?}", self.session_path))?;
            println!("✓ Session file removed");
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Флаг важнее переменной окружения
    let server = cli
        .server
        .or_else(|| std::env::var("GATHERING_SERVER").ok())
        .unwrap_or_else(|| "http://localhost:5000".to_string());

    println!("🔌 Connecting to: {}", server);

    let mut client = GatheringClient::new(server);

    let session_manager = SessionManager::new(cli.session_file)?;
    if let Some(user) = session_manager.load_session()? {
        println!("👤 Acting as: {} <{}>", user.name, user.email);
        client.set_current_user(user);
    }

    match &cli.command {
        Commands::Signup {
            name,
            email,
            password,
        } => {
            println!("📝 Creating account: {}", name);

            match client
                .signup(SignupRequest {
                    name: name.clone(),
                    email: email.clone(),
                    password: password.clone(),
                })
                .await
            {
                Ok(user) => {
                    println!("✅ Account created!");
                    println!("   User ID: {}", user.id);
                    println!("   Name: {}", user.name);
                    println!("   Email: {}", user.email);

                    session_manager.save_session(&user)?;
                }
                Err(e) => {
                    println!("❌ Signup failed: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Login { email, password } => {
            println!("🔑 Logging in as: {}", email);

            match client
                .login(LoginRequest {
                    email: email.clone(),
                    password: password.clone(),
                })
                .await
            {
                Ok(user) => {
                    println!("✅ Login successful!");
                    println!("   User ID: {}", user.id);
                    println!("   Name: {}", user.name);
                    println!("   Email: {}", user.email);

                    session_manager.save_session(&user)?;
                }
                Err(e) => {
                    println!("❌ Login failed: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Logout => {
            session_manager.clear_session()?;
            println!("👋 Logged out");
        }

        Commands::Status => match session_manager.load_session()? {
            Some(user) => {
                println!("👤 Session file: {:?}", session_manager.session_path);
                println!("   User ID: {}", user.id);
                println!("   Name: {}", user.name);
                println!("   Email: {}", user.email);
                println!("   Bio: {}", user.bio);
            }
            None => {
                println!("❌ No session found");
                println!("   Please login first: cargo run -- login --email <email> --password <password>");
            }
        },

        Commands::Update { name, bio } => {
            let user_id = match client.current_user() {
                Some(user) => user.id,
                None => {
                    println!("❌ No session. Please login first");
                    std::process::exit(1);
                }
            };

            println!("✏️ Updating profile #{}", user_id);

            match client
                .update_user(
                    user_id,
                    UpdateUserRequest {
                        name: name.clone(),
                        bio: bio.clone(),
                    },
                )
                .await
            {
                Ok(user) => {
                    println!("✅ Profile updated!");
                    println!("   Name: {}", user.name);
                    println!("   Bio: {}", user.bio);

                    session_manager.save_session(&user)?;
                }
                Err(e) => {
                    println!("❌ Failed to update profile: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Create {
            content,
            image,
            link,
        } => {
            println!("📝 Publishing post...");

            match client
                .create_post(content.clone(), image.clone(), link.clone())
                .await
            {
                Ok(post) => {
                    println!("✅ Post published!");
                    println!("   ID: {}", post.id);
                    println!("   Author: {}", post.author_name);
                    println!("   Content: {}", post.content);
                    println!("   Created: {}", post.timestamp);
                }
                Err(e) => {
                    if e.is_unauthorized() {
                        println!("❌ No session. Please login first:");
                        println!("   cargo run -- login --email <email> --password <password>");
                    } else {
                        println!("❌ Failed to publish post: {}", e);
                    }
                    std::process::exit(1);
                }
            }
        }

        Commands::Get { id } => {
            println!("🔍 Getting post #{}", id);

            match client.get_post(*id).await {
                Ok(post) => {
                    println!("✅ Post retrieved:");
                    println!("   ID: {}", post.id);
                    println!("   Author: {}", post.author_name);
                    println!("   Content: {}", post.content);
                    println!("   Likes: {}", post.likes);
                    println!("   Created: {}", post.timestamp);

                    if post.comments.is_empty() {
                        println!("   No comments");
                    } else {
                        println!("   Comments:");
                        for comment in &post.comments {
                            println!(
                                "     [{}] {}: {}",
                                comment.id, comment.author_name, comment.text
                            );
                        }
                    }
                }
                Err(e) => {
                    if e.is_not_found() {
                        println!("❌ Post #{} not found", id);
                        println!("   Tip: Use 'list' command to see the feed");
                    } else {
                        println!("❌ Error: {}", e);
                    }
                    std::process::exit(1);
                }
            }
        }

        Commands::List => {
            println!("📋 Fetching the feed...");

            match client.list_posts().await {
                Ok(posts) => {
                    println!("✅ Found {} posts", posts.len());
                    println!();

                    if posts.is_empty() {
                        println!("   The feed is empty");
                        println!("   Tip: Publish the first post: cargo run -- create --content \"Hello\"");
                    } else {
                        for (i, post) in posts.iter().enumerate() {
                            println!("   {}. [{}] {}", i + 1, post.id, post.author_name);
                            println!("      Content: {}", truncate(&post.content, 50));
                            println!(
                                "      ♥ {} · {} comments · {}",
                                post.likes,
                                post.comments.len(),
                                post.timestamp
                            );
                            println!();
                        }
                    }
                }
                Err(e) => {
                    println!("❌ Failed to fetch the feed: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Delete { id } => {
            println!("🗑️ Deleting post #{}", id);

            match client.delete_post(*id).await {
                Ok(()) => {
                    println!("✅ Post deleted!");
                }
                Err(e) => {
                    if e.is_not_found() {
                        println!("❌ Post #{} not found", id);
                    } else {
                        println!("❌ Failed to delete post: {}", e);
                    }
                    std::process::exit(1);
                }
            }
        }

        Commands::Like { id } => {
            println!("❤️ Toggling like on post #{}", id);

            match client.toggle_like(*id).await {
                Ok(post) => {
                    println!("✅ Post now has {} likes", post.likes);
                }
                Err(e) => {
                    if e.is_unauthorized() {
                        println!("❌ No session. Please login first");
                    } else if e.is_not_found() {
                        println!("❌ Post #{} not found", id);
                    } else {
                        println!("❌ Failed to toggle like: {}", e);
                    }
                    std::process::exit(1);
                }
            }
        }

        Commands::Comment { post, text } => {
            println!("💬 Commenting on post #{}", post);

            match client.add_comment(*post, text.clone()).await {
                Ok(comment) => {
                    println!("✅ Comment added!");
                    println!("   ID: {}", comment.id);
                    println!("   Text: {}", comment.text);
                }
                Err(e) => {
                    if e.is_unauthorized() {
                        println!("❌ No session. Please login first");
                    } else if e.is_not_found() {
                        println!("❌ Post #{} not found", post);
                    } else {
                        println!("❌ Failed to add comment: {}", e);
                    }
                    std::process::exit(1);
                }
            }
        }

        Commands::Uncomment { post, comment } => {
            println!("🗑️ Removing comment #{} from post #{}", comment, post);

            match client.delete_comment(*post, *comment).await {
                Ok(()) => {
                    println!("✅ Comment removed!");
                }
                Err(e) => {
                    if e.is_not_found() {
                        println!("❌ Post or comment not found");
                    } else {
                        println!("❌ Failed to remove comment: {}", e);
                    }
                    std::process::exit(1);
                }
            }
        }

        Commands::Stats => {
            println!("📊 Fetching stats...");

            match client.stats().await {
                Ok(stats) => {
                    println!("✅ Gathering totals:");
                    println!("   Users: {}", stats.total_users);
                    println!("   Posts: {}", stats.total_posts);
                    println!("   Comments: {}", stats.total_comments);
                    println!("   Likes: {}", stats.total_likes);
                }
                Err(e) => {
                    println!("❌ Failed to fetch stats: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Health => match client.health().await {
            Ok(health) => {
                println!("✅ {}: {}", health.status, health.message);
            }
            Err(e) => {
                println!("❌ Server unreachable: {}", e);
                std::process::exit(1);
            }
        },
    }

    Ok(())
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", &s[..max_len])
    }
}
