//! Deterministic strategy templates keyed by category.
//!
//! Used directly in `rule_based` mode and as the fallback whenever the model call fails or times
//! out, so the output depends on nothing but its inputs.

use std::fmt::Write;

use pwe_domain::category;

use crate::GenerationContext;

const PRIOR_PROMPT_CHARS: usize = 100;

const QUICK_START: &str = "\
**Quick Start Actions:**
1. Set up the necessary accounts today
2. Complete your profile and setup within 24 hours
3. Launch your first offering within 48 hours
4. Track daily progress and earnings
5. Optimize based on results every week";

const TIMELINE: &str = "\
**Expected Timeline:**
- Week 1: Setup and first attempts ($0-50)
- Weeks 2-4: Build momentum ($50-200/week)
- Months 2-3: Scale operations ($200-500/week)
- Month 4+: Full optimization ($500+/week)";

pub fn generate(prompt: &str, context: &GenerationContext) -> String {
	let category = category::classify_text(prompt).unwrap_or(category::GENERAL);
	let mut out = String::new();

	let _ = writeln!(out, "**Money-Making Strategy for: {}**\n", prompt.trim());
	let _ = writeln!(out, "{}\n", plan(category));
	let _ = writeln!(out, "{QUICK_START}\n");
	let _ = writeln!(out, "{TIMELINE}");

	if let Some(similar) = &context.similar {
		let previous = truncate(&similar.prompt, PRIOR_PROMPT_CHARS);

		let _ = writeln!(out, "\n**Insights from a similar request:**");
		let _ = writeln!(out, "- Previous request: {previous}");

		match (similar.success_score, similar.earnings) {
			(Some(score), Some(earnings)) => {
				let _ = writeln!(
					out,
					"- That strategy was rated {score}/10 and earned ${earnings:.2}; {}",
					if score >= 7 {
						"repeat the steps that worked and scale them."
					} else {
						"adjust the steps that underperformed before scaling."
					}
				);
			},
			_ => {
				let _ = writeln!(out, "- No feedback was recorded for it yet.");
			},
		}
	}

	out.push_str("\nRemember: success requires consistent action and adaptation!");

	out
}

fn plan(category: &str) -> &'static str {
	match category {
		"freelance" => {
			"\
1. Create profiles on Upwork, Fiverr, and Freelancer
2. Identify your core skills (writing, design, programming, etc.)
3. Start with competitive pricing to build reviews
4. Focus on quick turnaround projects initially
5. Raise rates gradually as your reputation grows
6. Aim for $20-50/hour within the first month
7. Scale with package deals and retainer clients"
		},
		"content" => {
			"\
1. Pick a niche you can publish about every week
2. Set up a blog or channel with a consistent schedule
3. Batch-produce your first ten pieces of content
4. Repurpose each piece across social platforms
5. Build an email list from day one
6. Monetize with ads, sponsorships, and digital products
7. Reinvest early earnings into better production"
		},
		"outreach" => {
			"\
1. Define the exact customer you can help fastest
2. Build a list of 100 qualified prospects
3. Write a short, specific offer with one clear call to action
4. Send personalized messages in small daily batches
5. Follow up twice before moving on
6. Track reply and conversion rates per message variant
7. Turn the best-performing pitch into a repeatable process"
		},
		"ecommerce" => {
			"\
1. Research trending products with low competition
2. Find reliable suppliers (Alibaba, local manufacturers)
3. Create an online store (Shopify, Etsy, Amazon FBA)
4. Optimize product listings with SEO
5. Run targeted social media ads
6. Focus on customer service and reviews
7. Expand the product line based on successful items"
		},
		"investment" => {
			"\
1. Keep an emergency fund of 3-6 months of expenses first
2. Start with index funds for stable growth
3. Learn about dividend stocks for passive income
4. Consider REITs for real estate exposure
5. Use dollar-cost averaging for consistent investing
6. Diversify across asset classes and sectors
7. Reinvest profits to compound returns"
		},
		"online" => {
			"\
1. Choose a profitable niche (health, finance, tech)
2. Create valuable content (blog, YouTube, social media)
3. Build an email list of potential customers
4. Develop digital products (courses, ebooks, tools)
5. Use affiliate marketing for passive income
6. Monetize through ads, sponsorships, and partnerships
7. Scale with automation and outsourcing"
		},
		_ => {
			"\
1. List the skills, assets, and hours you can commit
2. Pick one offer that matches them and has paying demand
3. Validate demand with five real conversations this week
4. Launch the simplest version and collect your first payment
5. Track every hour and dollar to find the best return
6. Double down on what pays and drop what does not
7. Automate or outsource repeatable work to scale"
		},
	}
}

fn truncate(text: &str, max_chars: usize) -> String {
	let trimmed = text.trim();

	if trimmed.chars().count() <= max_chars {
		return trimmed.to_string();
	}

	let mut out: String = trimmed.chars().take(max_chars).collect();

	out.push_str("...");

	out
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::PriorStrategy;

	#[test]
	fn picks_plan_from_prompt_category() {
		let text = generate("Find freelance gigs", &GenerationContext::default());

		assert!(text.contains("Upwork"));
		assert!(!text.contains("Insights from a similar request"));
	}

	#[test]
	fn unmatched_prompt_uses_general_plan() {
		let text = generate("Help me", &GenerationContext::default());

		assert!(text.contains("Validate demand"));
	}

	#[test]
	fn similar_request_without_feedback_is_noted() {
		let context = GenerationContext {
			request: None,
			similar: Some(PriorStrategy {
				prompt: "x".repeat(150),
				response_text: String::new(),
				success_score: None,
				earnings: None,
				similarity: 0.9,
			}),
		};
		let text = generate("Start a blog", &context);

		assert!(text.contains(&format!("{}...", "x".repeat(100))));
		assert!(text.contains("No feedback was recorded"));
	}

	#[test]
	fn plans_are_numbered_lists() {
		for category in category::categories() {
			assert_eq!(plan(category).lines().count(), 7, "{category}");
			assert!(plan(category).starts_with("1. "), "{category}");
		}
	}
}
