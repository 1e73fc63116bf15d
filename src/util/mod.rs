pub mod fetcher;
pub mod mailer;
pub mod parser;
pub mod renderer;
pub mod stripper;
pub mod translator;
