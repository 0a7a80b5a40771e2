//! The portfolio's scripted content. `{name}` is the site owner.

use crate::table::{BucketConfig, ResponseTableConfig, Topic};

pub const DEFAULT_OWNER: &str = "Rolando";

/// Greeting appended when the widget first opens
pub fn welcome_message(owner: &str) -> String {
    format!(
        "Hi! I'm {}'s AI assistant. I can help you learn about his experience, skills, and projects. What would you like to know?",
        owner
    )
}

/// Starter prompts offered while a session is still empty
pub fn quick_questions(owner: &str) -> Vec<String> {
    vec![
        format!("What's {}'s experience?", owner),
        "What technologies does he use?".to_string(),
        "Tell me about his projects".to_string(),
        "How can I contact him?".to_string(),
    ]
}

fn bucket(topic: Topic, keywords: &[&str], replies: &[&str]) -> BucketConfig {
    BucketConfig {
        topic,
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        replies: replies.iter().map(|r| r.to_string()).collect(),
    }
}

pub(crate) fn default_buckets() -> Vec<BucketConfig> {
    vec![
        bucket(
            Topic::Greeting,
            &["hello", "hi", "hey", "greetings", "good morning", "good afternoon"],
            &[
                "Hello! I'm {name}'s AI assistant. I can help you learn about his experience, skills, and projects. What would you like to know?",
                "Hi there! Welcome to {name}'s portfolio. I'm here to answer any questions about his background and work. How can I assist you?",
                "Greetings! I'm an AI assistant created to help visitors navigate {name}'s portfolio. Feel free to ask me anything about his skills or projects!",
            ],
        ),
        bucket(
            Topic::Resume,
            &["resume", "cv", "download*", "curriculum vitae"],
            &[
                "Here's {name}'s resume, it covers his experience, skills and education in one page: [DOWNLOAD_RESOURCE]",
                "Sure! You can download the latest version of {name}'s CV here: [DOWNLOAD_RESOURCE]",
            ],
        ),
        bucket(
            Topic::Experience,
            &["experience*", "work", "background", "career"],
            &[
                "{name} has 3+ years of experience as a full-stack developer, specializing in **React**, **Next.js**, **Node.js**, and modern web technologies. He's worked on various projects ranging from e-commerce platforms to real-time applications.",
                "{name} is experienced in both frontend and backend development, with expertise in the React ecosystem, TypeScript, and cloud technologies. He's passionate about creating scalable and user-friendly applications.",
            ],
        ),
        bucket(
            Topic::Skills,
            &["skill*", "technolog*", "tech", "programming", "stack", "languages"],
            &[
                "{name}'s main skills include React, Next.js, TypeScript, Node.js, PostgreSQL, MongoDB, AWS, and modern CSS frameworks like Tailwind. He's also experienced in mobile development with React Native.",
                "His technical stack covers the full spectrum:\n- **Frontend**: React, Next.js, TypeScript\n- **Backend**: Node.js, Express, Python\n- **Databases**: PostgreSQL, MongoDB\n- **Cloud**: AWS, Vercel\n\nPlus design skills with Figma and UI/UX principles.",
            ],
        ),
        bucket(
            Topic::Projects,
            &["project*", "portfolio", "built", "demo*"],
            &[
                "Some of {name}'s notable projects include an e-commerce platform, task management app, weather dashboard, blog CMS, and real-time chat application. Each showcases different aspects of his full-stack capabilities.",
                "He's built various applications including collaborative tools, data visualization dashboards, and mobile apps. You can check out his projects section to see live demos and source code on GitHub.",
            ],
        ),
        bucket(
            Topic::Contact,
            &["contact", "reach", "email", "hire", "hiring", "get in touch"],
            &[
                "You can reach {name} through the contact form on this website, or connect with him on LinkedIn, GitHub, or Twitter. He's always interested in discussing new opportunities and projects!",
                "The best way to get in touch is through the contact section below. {name} is open to freelance work, full-time opportunities, and collaboration on interesting projects.",
            ],
        ),
    ]
}

pub(crate) fn default_fallback() -> Vec<String> {
    [
        "That's an interesting question! While I can tell you about {name}'s experience, skills, and projects, I'd recommend reaching out to him directly for more specific inquiries.",
        "I'm focused on helping with questions about {name}'s portfolio and background. For other topics, feel free to contact him directly using the form below!",
        "I can help you learn about {name}'s work experience, technical skills, projects, or how to get in touch with him. What specific area interests you?",
    ]
    .iter()
    .map(|r| r.to_string())
    .collect()
}

/// The built-in table in its serialized form, as a starting point for a custom file
pub fn default_table_config() -> ResponseTableConfig {
    ResponseTableConfig {
        buckets: default_buckets(),
        fallback: default_fallback(),
    }
}
