#![allow(dead_code)]

use crr_viewer::{Field, Record};

pub const PREFIX: &str = r"C:\Users\sinjav\Documents\";

pub fn article(
    part: &str,
    title: &str,
    chapter: &str,
    section: &str,
    number: &str,
) -> Record {
    Record::new()
        .with(Field::PartName, part)
        .with(Field::TitleName, title)
        .with(Field::ChapterName, chapter)
        .with(Field::SectionName, section)
        .with(Field::Article, number)
        .with(Field::ArticleName, format!("Article {number}"))
}

/// Small report covering two parts, with every reference column exercised.
pub fn sample_report() -> Vec<Record> {
    vec![
        article("PART ONE", "TITLE I", "CHAPTER 1", "SECTION 1", "1")
            .with(Field::ArticleContent, "Subject matter")
            .with(
                Field::ReferencedInSas,
                format!(r"{PREFIX}proj\src\calc.sas|10, 20"),
            )
            .with(Field::ReferencedInTxt, "not found")
            .with(Field::ReferencedInDefects, "CRR-12; not linked")
            .with(Field::ReferencedInReqts, "not found"),
        article("PART ONE", "TITLE I", "CHAPTER 2", "", "2")
            .with(Field::ArticleContent, "Scope of application")
            .with(Field::ReferencedInSas, "not found")
            .with(Field::ReferencedInTxt, "not found")
            .with(Field::ReferencedInDefects, "not found")
            .with(Field::ReferencedInReqts, "REQ-7 capital buffers"),
        article("PART ONE", "TITLE II", "CHAPTER 1", "", "12")
            .with(Field::ReferencedInSas, "out of scope")
            .with(Field::ReferencedInTxt, "out of scope")
            .with(Field::OutOfScope, "out of scope"),
        article("PART TWO", "TITLE I", "CHAPTER 1", "SECTION 2", "92")
            .with(Field::ArticleContent, "Own funds requirements")
            .with(Field::ReferencedInSas, "NOT FOUND")
            .with(
                Field::ReferencedInTxt,
                format!(r"{PREFIX}docs\scope.txt|Intro|Scope|3|covered here"),
            )
            .with(Field::ReferencedInDefects, "Defect CRR-99 open")
            .with(Field::ReferencedInReqts, ""),
    ]
}
