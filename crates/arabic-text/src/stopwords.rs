use std::collections::HashSet;
use std::sync::LazyLock;

use crate::normalize;

/// Function words and common adjectives skipped by the word pass. Stored as
/// written; the lookup set holds their normalized forms.
const RAW_STOPWORDS: &[&str] = &[
    "من", "في", "على", "الى", "إلى", "عن", "هذا", "هذه", "ذلك", "ثم", "قد", "ما", "لا", "لم",
    "لن", "إن", "أن", "كان", "كانت", "هنا", "هناك", "حيث", "كيف", "متى", "أين", "لماذا", "ماذا",
    "منذ", "حتى", "أي", "أية", "كل", "بعض", "أكثر", "أقل", "أكبر", "أصغر", "أحسن", "أسوأ", "أفضل",
    "أقرب", "أبعد", "أسرع", "أبطأ", "أقوى", "أضعف", "أطول", "أقصر", "أعرض", "أضيق", "أعلى",
    "أدنى", "أمام", "خلف", "يمين", "يسار", "فوق", "تحت", "داخل", "خارج", "قريب", "بعيد", "جديد",
    "قديم", "كبير", "صغير", "طويل", "قصير", "عريض", "ضيق", "عالي", "منخفض", "سريع", "بطيء",
    "قوي", "ضعيف", "حار", "بارد", "نظيف", "قذر", "جميل", "قبيح", "مفيد", "ضار", "سهل", "صعب",
    "ممكن", "مستحيل", "ضروري", "اختياري", "مهم", "صحيح", "خطأ", "حقيقي", "كاذب", "مفتوح",
    "مغلق", "ممتلئ", "فارغ", "مظلم", "مضيء", "هادئ", "صاخب", "ناعم", "خشن", "رطب", "جاف",
    "ثقيل", "خفيف", "غالي", "رخيص", "غني", "فقير", "سعيد", "حزين", "مرح", "جدي", "لطيف",
    "قاسي", "ذكي", "غبي", "متعلم", "جاهل", "ماهر", "مبتدئ", "محترف", "هواة", "مشهور", "مجهول",
    "مقبول", "مرفوض", "محمود", "مذموم", "مشكور", "مكروه", "محبوب", "مبغوض", "مطلوب",
];

static STOPWORDS: LazyLock<HashSet<String>> =
    LazyLock::new(|| RAW_STOPWORDS.iter().map(|w| normalize(w)).collect());

/// Membership test for an already-normalized token.
pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(word)
}
