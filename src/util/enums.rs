use teloxide::macros::BotCommands;

#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "snake_case", description = "Available commands:")]
pub enum Command {
    #[command(description = "subscribe to news, or to a group by id")]
    Start(String),
    #[command(description = "show the subscription menu")]
    Home,
    #[command(description = "ask our team for a consultation")]
    Consultation,
    #[command(description = "show help")]
    Help,
    #[command(description = "become an admin")]
    Admin(String),
    #[command(description = "become a superadmin")]
    Superadmin(String),
    #[command(description = "compose a broadcast (admins)")]
    Publish,
    #[command(description = "leave publish mode (admins)")]
    Stop,
    #[command(description = "create a subscription group (admins)")]
    CreateGroup,
}

pub struct AudioStruct {
    pub mime_type: String,
    pub file_id: String,
    pub file_name: String,
}
