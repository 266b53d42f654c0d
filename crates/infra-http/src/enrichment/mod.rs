mod decision_maker_client;
mod email_client;

pub use decision_maker_client::GeminiDecisionMakerClient;
pub use email_client::ApolloEmailClient;
