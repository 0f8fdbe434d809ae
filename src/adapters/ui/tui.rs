//! Implements InputPort. Inquire-based interactive menu over ReviewService.

use crate::adapters::ui::progress::spinner;
use crate::domain::{
    DEFAULT_PAGE_SIZE, DomainError, NewReview, Review, ReviewQuery, Sentiment,
};
use crate::ports::InputPort;
use crate::usecases::ReviewService;
use async_trait::async_trait;
use crossterm::style::Stylize;
use inquire::error::InquireError;
use inquire::{Confirm, CustomType, Select, Text};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuAction {
    Analyze,
    List,
    View,
    Delete,
    Export,
    Exit,
}

impl MenuAction {
    const ALL: [MenuAction; 6] = [
        MenuAction::Analyze,
        MenuAction::List,
        MenuAction::View,
        MenuAction::Delete,
        MenuAction::Export,
        MenuAction::Exit,
    ];
}

impl fmt::Display for MenuAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MenuAction::Analyze => "Analyze a review",
            MenuAction::List => "List reviews",
            MenuAction::View => "View review",
            MenuAction::Delete => "Delete review",
            MenuAction::Export => "Export reviews to CSV",
            MenuAction::Exit => "Exit",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageAction {
    Next,
    Previous,
    Back,
}

impl fmt::Display for PageAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PageAction::Next => "Next page",
            PageAction::Previous => "Previous page",
            PageAction::Back => "Back to menu",
        })
    }
}

/// Esc / Ctrl-C on a prompt means "back", not an error.
fn is_cancel(e: &InquireError) -> bool {
    matches!(
        e,
        InquireError::OperationCanceled | InquireError::OperationInterrupted
    )
}

fn ui_err(e: InquireError) -> DomainError {
    DomainError::Ui(e.to_string())
}

/// Prompt result: `Ok(None)` when the user cancelled.
fn prompt<T>(result: Result<T, InquireError>) -> Result<Option<T>, DomainError> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(e) if is_cancel(&e) => Ok(None),
        Err(e) => Err(ui_err(e)),
    }
}

fn styled_sentiment(sentiment: Option<Sentiment>) -> String {
    match sentiment {
        Some(Sentiment::Positive) => "positive".green().to_string(),
        Some(Sentiment::Negative) => "negative".red().to_string(),
        Some(Sentiment::Neutral) => "neutral".yellow().to_string(),
        None => "n/a".dark_grey().to_string(),
    }
}

fn preview(text: &str, max: usize) -> String {
    let flat = text.replace('\n', " ");
    if flat.chars().count() <= max {
        flat
    } else {
        format!("{}...", flat.chars().take(max).collect::<String>())
    }
}

fn print_review(review: &Review) {
    println!();
    println!(
        "{} {}  {}",
        format!("#{}", review.id).bold(),
        review.product_name.as_deref().unwrap_or("(no product)"),
        review
            .created_at
            .format("%Y-%m-%d %H:%M UTC")
            .to_string()
            .dark_grey()
    );
    println!("  {}", preview(&review.review_text, 200));
    let score = review
        .sentiment_score
        .map(|s| format!(" ({:.2})", s))
        .unwrap_or_default();
    println!(
        "  Sentiment: {}{}   Status: {}",
        styled_sentiment(review.sentiment),
        score,
        review.analysis_status
    );
    if let Some(points) = &review.key_points {
        println!("  Key points:");
        for point in points {
            println!("    - {}", point);
        }
    }
    if let Some(err) = &review.error_message {
        println!("  {}", err.as_str().red());
    }
}

fn print_row(review: &Review) {
    println!(
        "  {:>5}  {:<9}  {:<20}  {}",
        review.id,
        review.sentiment.map(|s| s.as_str()).unwrap_or("-"),
        preview(review.product_name.as_deref().unwrap_or("-"), 20),
        preview(&review.review_text, 60)
    );
}

/// TUI adapter. Inquire prompts.
pub struct TuiInputPort {
    service: Arc<ReviewService>,
    export_dir: PathBuf,
}

impl TuiInputPort {
    pub fn new(service: Arc<ReviewService>, export_dir: PathBuf) -> Self {
        Self {
            service,
            export_dir,
        }
    }

    async fn analyze(&self) -> Result<(), DomainError> {
        let Some(text) = prompt(Text::new("Review text:").prompt())? else {
            return Ok(());
        };
        let Some(product) = prompt(
            Text::new("Product name (optional):")
                .with_default("")
                .prompt(),
        )?
        else {
            return Ok(());
        };

        let review = match NewReview::new(text, Some(product)) {
            Ok(r) => r,
            Err(e) => {
                println!("{}", e.to_string().red());
                return Ok(());
            }
        };

        let pb = spinner("Analyzing review...");
        let result = self.service.analyze_review(review).await;
        pb.finish_and_clear();

        let review = result?;
        print_review(&review);
        Ok(())
    }

    async fn list(&self) -> Result<(), DomainError> {
        let filters = vec!["All", "positive", "negative", "neutral"];
        let Some(filter) = prompt(Select::new("Filter by sentiment:", filters).prompt())? else {
            return Ok(());
        };
        let sentiment = match filter {
            "All" => None,
            other => Some(other.parse::<Sentiment>()?),
        };

        let mut skip = 0u32;
        loop {
            let query = ReviewQuery::new(skip, DEFAULT_PAGE_SIZE, sentiment);
            let page = self.service.list_reviews(query).await?;
            if page.reviews.is_empty() {
                println!("No reviews found.");
                return Ok(());
            }
            println!(
                "\nShowing {}-{} of {}",
                skip + 1,
                u64::from(skip) + page.reviews.len() as u64,
                page.total
            );
            for review in &page.reviews {
                print_row(review);
            }

            let mut actions = Vec::new();
            if u64::from(skip) + (page.reviews.len() as u64) < page.total {
                actions.push(PageAction::Next);
            }
            if skip > 0 {
                actions.push(PageAction::Previous);
            }
            actions.push(PageAction::Back);

            match prompt(Select::new("Page:", actions).prompt())? {
                Some(PageAction::Next) => skip += query.limit,
                Some(PageAction::Previous) => skip = skip.saturating_sub(query.limit),
                Some(PageAction::Back) | None => return Ok(()),
            }
        }
    }

    async fn view(&self) -> Result<(), DomainError> {
        let Some(id) = prompt(CustomType::<i64>::new("Review ID:").prompt())? else {
            return Ok(());
        };
        match self.service.get_review(id).await {
            Ok(review) => print_review(&review),
            Err(DomainError::NotFound(_)) => println!("Review with id {} not found", id),
            Err(e) => return Err(e),
        }
        Ok(())
    }

    async fn delete(&self) -> Result<(), DomainError> {
        let Some(id) = prompt(CustomType::<i64>::new("Review ID to delete:").prompt())? else {
            return Ok(());
        };
        let confirmed = prompt(
            Confirm::new(&format!("Delete review {}?", id))
                .with_default(false)
                .prompt(),
        )?
        .unwrap_or(false);
        if !confirmed {
            return Ok(());
        }
        match self.service.delete_review(id).await {
            Ok(()) => println!("Review {} deleted successfully", id),
            Err(DomainError::NotFound(_)) => println!("Review with id {} not found", id),
            Err(e) => return Err(e),
        }
        Ok(())
    }

    async fn export(&self) -> Result<(), DomainError> {
        let path = self.service.export_csv(&self.export_dir).await?;
        println!("Exported to {}", path.display());
        Ok(())
    }
}

#[async_trait]
impl InputPort for TuiInputPort {
    async fn run(&self) -> Result<(), DomainError> {
        loop {
            let Some(action) =
                prompt(Select::new("What would you like to do?", MenuAction::ALL.to_vec()).prompt())?
            else {
                return Ok(());
            };

            let outcome = match action {
                MenuAction::Analyze => self.analyze().await,
                MenuAction::List => self.list().await,
                MenuAction::View => self.view().await,
                MenuAction::Delete => self.delete().await,
                MenuAction::Export => self.export().await,
                MenuAction::Exit => return Ok(()),
            };

            // Per-action failures are shown and the menu continues; prompt I/O errors end the run.
            match outcome {
                Ok(()) => {}
                Err(e @ DomainError::Ui(_)) => return Err(e),
                Err(e) => {
                    warn!(error = %e, action = %action, "action failed");
                    println!("{}", e.to_string().red());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_truncates() {
        assert_eq!(preview("short", 10), "short");
        assert_eq!(preview("line one\nline two", 8), "line one...");
    }

    #[test]
    fn test_cancel_detection() {
        assert!(is_cancel(&InquireError::OperationCanceled));
        assert!(!is_cancel(&InquireError::InvalidConfiguration("x".into())));
    }
}
